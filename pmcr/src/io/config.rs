//! Pipeline configuration (TOML).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Pipeline configuration.
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path of the append-only audit log (JSONL).
    pub audit_log: String,

    /// Path of the append-only knowledge log (JSONL).
    pub knowledge_log: String,

    pub generator: GeneratorConfig,

    pub run: RunDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Command to execute per generative call (template id is appended).
    pub command: Vec<String>,

    /// Wall-clock budget per generative call in seconds.
    pub call_timeout_secs: u64,

    /// Truncate backend responses beyond this many bytes.
    pub output_limit_bytes: usize,
}

/// Run-scoped context parameters with their declared defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunDefaults {
    pub priority: String,
    pub constraints: String,
    pub available_skills: String,
    pub context: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: vec!["llm-exec".to_string()],
            call_timeout_secs: 5 * 60,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            priority: "medium".to_string(),
            constraints: String::new(),
            available_skills: String::new(),
            context: String::new(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            audit_log: "logs/audit.jsonl".to_string(),
            knowledge_log: "logs/knowledge.jsonl".to_string(),
            generator: GeneratorConfig::default(),
            run: RunDefaults::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.audit_log.trim().is_empty() {
            return Err(anyhow!("audit_log must not be empty"));
        }
        if self.knowledge_log.trim().is_empty() {
            return Err(anyhow!("knowledge_log must not be empty"));
        }
        if self.generator.command.is_empty() || self.generator.command[0].trim().is_empty() {
            return Err(anyhow!("generator.command must be a non-empty array"));
        }
        if self.generator.call_timeout_secs == 0 {
            return Err(anyhow!("generator.call_timeout_secs must be > 0"));
        }
        if self.generator.output_limit_bytes == 0 {
            return Err(anyhow!("generator.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PipelineConfig::default()`.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        let cfg = PipelineConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PipelineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &PipelineConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, PipelineConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let mut cfg = PipelineConfig::default();
        cfg.generator.command = vec!["my-backend".to_string(), "--fast".to_string()];
        cfg.run.priority = "high".to_string();
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut cfg = PipelineConfig::default();
        cfg.generator.call_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_empty_generator_command() {
        let mut cfg = PipelineConfig::default();
        cfg.generator.command.clear();
        assert!(cfg.validate().is_err());
    }
}
