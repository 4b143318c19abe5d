//! Generative-backend boundary.
//!
//! The [`Generator`] trait decouples stage execution from the actual text
//! backend. The core treats the backend as an opaque function from a template
//! id plus named parameters to free text; it may fail or return ill-formed
//! content, and the contract executor absorbs both. Tests use scripted
//! generators that return predetermined responses without spawning processes.

use std::collections::BTreeMap;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::process::run_command_with_timeout;

/// Named parameters for one generative call.
pub type NamedParams = BTreeMap<String, String>;

/// Abstraction over generative text backends.
pub trait Generator {
    /// Render and execute the template identified by `template_id` with the
    /// given parameters, returning the raw response text.
    fn invoke(&self, template_id: &str, params: &NamedParams) -> Result<String>;
}

/// Generator that spawns a configured command per call.
///
/// The template id is appended to the configured argv; parameters are piped
/// to stdin as a JSON object; the response is read from stdout. A timeout or
/// nonzero exit is an invoke error, which the contract executor turns into a
/// fallback.
#[derive(Debug)]
pub struct CommandGenerator {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandGenerator {
    pub fn new(command: Vec<String>, timeout: Duration, output_limit_bytes: usize) -> Result<Self> {
        if command.is_empty() || command[0].trim().is_empty() {
            return Err(anyhow!("generator command must be a non-empty array"));
        }
        Ok(Self {
            command,
            timeout,
            output_limit_bytes,
        })
    }
}

impl Generator for CommandGenerator {
    #[instrument(skip_all, fields(template_id, timeout_secs = self.timeout.as_secs()))]
    fn invoke(&self, template_id: &str, params: &NamedParams) -> Result<String> {
        info!(command = %self.command[0], "invoking generator command");

        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..]).arg(template_id);

        let stdin = serde_json::to_vec(params).context("serialize generator parameters")?;
        let output = run_command_with_timeout(
            cmd,
            Some(&stdin),
            self.timeout,
            self.output_limit_bytes,
        )
        .context("run generator command")?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "generator timed out");
            return Err(anyhow!("generator timed out after {:?}", self.timeout));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "generator command failed");
            return Err(anyhow!(
                "generator command failed with status {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        debug!(response_bytes = output.stdout.len(), "generator responded");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> NamedParams {
        let mut map = NamedParams::new();
        map.insert("goal".to_string(), "demo".to_string());
        map
    }

    #[test]
    fn rejects_empty_command() {
        let err = CommandGenerator::new(Vec::new(), Duration::from_secs(1), 1000).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn passes_template_id_and_reads_stdout() {
        // Echoes its last argument: stands in for a backend that answers per template.
        let generator = CommandGenerator::new(
            vec!["sh".to_string(), "-c".to_string(), "printf '%s' \"$1\"".to_string(), "sh".to_string()],
            Duration::from_secs(5),
            10_000,
        )
        .expect("generator");
        let response = generator.invoke("orchestrator-agent", &params()).expect("invoke");
        assert_eq!(response, "orchestrator-agent");
    }

    #[test]
    fn pipes_params_as_json_stdin() {
        // The template id still arrives as $1; this backend ignores it.
        let generator = CommandGenerator::new(
            vec![
                "sh".to_string(),
                "-c".to_string(),
                "cat -".to_string(),
                "sh".to_string(),
            ],
            Duration::from_secs(5),
            10_000,
        )
        .expect("generator");
        let response = generator.invoke("ignored", &params()).expect("invoke");
        assert_eq!(response, "{\"goal\":\"demo\"}");
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let generator = CommandGenerator::new(
            vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()],
            Duration::from_secs(5),
            10_000,
        )
        .expect("generator");
        let err = generator.invoke("any", &params()).unwrap_err();
        assert!(err.to_string().contains("failed with status"));
    }
}
