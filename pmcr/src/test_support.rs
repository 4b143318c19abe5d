//! Scripted backends and in-memory sinks for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Result, anyhow};

use crate::io::audit::{AuditEntry, AuditSink};
use crate::io::generator::{Generator, NamedParams};
use crate::io::knowledge::{KnowledgeEntry, KnowledgeSink};

/// One scripted backend response.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Return this text.
    Text(String),
    /// Fail the call with this message.
    Failure(String),
}

impl ScriptedResponse {
    pub fn text(text: &str) -> Self {
        ScriptedResponse::Text(text.to_string())
    }

    pub fn failure(message: &str) -> Self {
        ScriptedResponse::Failure(message.to_string())
    }
}

/// Generator that replays a scripted response sequence, or repeats one
/// response forever.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<ScriptedResponse>>,
    repeat: Option<ScriptedResponse>,
}

impl ScriptedGenerator {
    /// Repeat `text` for every invocation.
    pub fn always(text: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeat: Some(ScriptedResponse::text(text)),
        }
    }

    /// Replay `responses` in order; invocations past the end are errors.
    pub fn sequence(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            repeat: None,
        }
    }
}

impl Generator for ScriptedGenerator {
    fn invoke(&self, template_id: &str, _params: &NamedParams) -> Result<String> {
        let next = {
            let mut script = self.script.lock().expect("script lock");
            script.pop_front().or_else(|| self.repeat.clone())
        };
        match next {
            Some(ScriptedResponse::Text(text)) => Ok(text),
            Some(ScriptedResponse::Failure(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("script exhausted at template {template_id}")),
        }
    }
}

/// Generator that always fails.
pub struct FailingGenerator {
    message: String,
}

impl FailingGenerator {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Generator for FailingGenerator {
    fn invoke(&self, _template_id: &str, _params: &NamedParams) -> Result<String> {
        Err(anyhow!(self.message.clone()))
    }
}

/// Generator that records the last invocation and returns a fixed response.
pub struct CapturingGenerator {
    response: String,
    last: Mutex<Option<(String, NamedParams)>>,
}

impl CapturingGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            last: Mutex::new(None),
        }
    }

    pub fn last_invocation(&self) -> Option<(String, NamedParams)> {
        self.last.lock().expect("capture lock").clone()
    }
}

impl Generator for CapturingGenerator {
    fn invoke(&self, template_id: &str, params: &NamedParams) -> Result<String> {
        *self.last.lock().expect("capture lock") = Some((template_id.to_string(), params.clone()));
        Ok(self.response.clone())
    }
}

/// Audit sink collecting entries in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit lock").clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.entries.lock().expect("audit lock").push(entry.clone());
        Ok(())
    }
}

/// Audit sink that rejects every append.
pub struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn append(&self, _entry: &AuditEntry) -> Result<()> {
        Err(anyhow!("audit sink unavailable"))
    }
}

/// Knowledge sink collecting entries in memory.
#[derive(Default)]
pub struct MemoryKnowledgeSink {
    entries: Mutex<Vec<KnowledgeEntry>>,
}

impl MemoryKnowledgeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<KnowledgeEntry> {
        self.entries.lock().expect("knowledge lock").clone()
    }
}

impl KnowledgeSink for MemoryKnowledgeSink {
    fn append(&self, entry: &KnowledgeEntry) -> Result<()> {
        self.entries
            .lock()
            .expect("knowledge lock")
            .push(entry.clone());
        Ok(())
    }
}

/// Knowledge sink that rejects every append.
pub struct FailingKnowledgeSink;

impl KnowledgeSink for FailingKnowledgeSink {
    fn append(&self, _entry: &KnowledgeEntry) -> Result<()> {
        Err(anyhow!("knowledge sink unavailable"))
    }
}
