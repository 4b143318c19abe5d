//! Append-only audit trail of stage transitions.
//!
//! Every stage completion is recorded as one immutable [`AuditEntry`]. Audit
//! is best-effort observability, not a transactional requirement: a failed
//! append is surfaced with `warn!` by the engine but never fails the run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Immutable record of one stage transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: String,
    /// Run id shared by all entries of one pipeline run.
    pub correlation_id: String,
    pub severity: Severity,
}

impl AuditEntry {
    /// Entry for a completed stage whose output event was routed onward.
    pub fn stage_completed(run_id: &str, stage: Stage, details: String) -> Self {
        Self {
            timestamp: Utc::now(),
            action: format!("{stage}_completed"),
            details,
            correlation_id: run_id.to_string(),
            severity: Severity::Info,
        }
    }
}

/// Append-only sink for audit entries.
///
/// Implementations must make each append atomic with respect to concurrent
/// runs: entries from independent runs may interleave in order, but never
/// within a single entry.
pub trait AuditSink {
    fn append(&self, entry: &AuditEntry) -> Result<()>;
}

/// File-backed sink writing one compact JSON object per line.
pub struct JsonlAuditSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry).context("serialize audit entry")?;
        line.push('\n');
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow!("audit sink lock poisoned"))?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create audit dir {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open audit log {}", self.path.display()))?;
        // Single write call per entry keeps appends atomic per line.
        file.write_all(line.as_bytes())
            .with_context(|| format!("append audit log {}", self.path.display()))?;
        Ok(())
    }
}
