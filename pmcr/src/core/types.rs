//! Stage identities and output contracts.
//!
//! Each pipeline stage produces exactly one of the typed records below. The
//! records are the only payloads that travel between stages: raw backend text
//! never crosses the contract boundary (see [`crate::contract`]).

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One stage of the fixed pipeline chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Orchestrator,
    Planner,
    Maker,
    Checker,
    Reflector,
    Knowledge,
    Audit,
}

impl Stage {
    /// Stable lowercase name used in audit entries and reports.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Orchestrator => "orchestrator",
            Stage::Planner => "planner",
            Stage::Maker => "maker",
            Stage::Checker => "checker",
            Stage::Reflector => "reflector",
            Stage::Knowledge => "knowledge",
            Stage::Audit => "audit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a stage output is a genuine backend result or a substituted fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Provenance {
    Genuine,
    Fallback { reason: String },
}

impl Provenance {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Provenance::Fallback { .. })
    }

    /// The failure reason when this is a fallback.
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Provenance::Genuine => None,
            Provenance::Fallback { reason } => Some(reason),
        }
    }
}

/// A schema-valid stage output together with its provenance annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult<T> {
    pub value: T,
    pub provenance: Provenance,
}

/// Contract shared by all five stage output schemas.
///
/// Implementors must keep their serialized form in sync with the JSON Schema
/// embedded by the owning agent module.
pub trait StageOutput: DeserializeOwned + Serialize {
    /// Clamp numeric scores to their declared range. Applied to genuine and
    /// fallback values alike, so downstream stages never see an out-of-range
    /// confidence or quality score.
    fn clamp_scores(&mut self);
}

/// Orchestrator output: routing decision for the goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorDecision {
    pub decision: String,
    pub reasoning: String,
    pub next_steps: Vec<String>,
    pub confidence: f64,
}

impl StageOutput for OrchestratorDecision {
    fn clamp_scores(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }
}

/// One task within an execution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    pub task: String,
    pub dependencies: Vec<String>,
    pub success_criteria: String,
}

/// Planner output: ordered task list with risks and resource needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub execution_plan: Vec<PlanTask>,
    pub risk_assessment: Vec<String>,
    pub resource_requirements: Vec<String>,
    pub estimated_duration: String,
    pub confidence: f64,
}

impl StageOutput for ExecutionPlan {
    fn clamp_scores(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub duration_ms: u64,
    pub success_rate: f64,
}

/// Maker output: what was executed and produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: String,
    pub executed_tasks: Vec<String>,
    pub generated_artifacts: Vec<String>,
    pub new_skills_created: Vec<String>,
    pub execution_metrics: ExecutionMetrics,
}

impl StageOutput for ExecutionResult {
    fn clamp_scores(&mut self) {
        self.execution_metrics.success_rate = self.execution_metrics.success_rate.clamp(0.0, 1.0);
    }
}

/// Checker output: validation verdict over execution results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub validation_status: String,
    pub quality_score: f64,
    pub issues_found: Vec<String>,
    pub recommendations: Vec<String>,
    pub compliance_check: String,
}

impl StageOutput for ValidationResult {
    fn clamp_scores(&mut self) {
        self.quality_score = self.quality_score.clamp(0.0, 1.0);
    }
}

/// Reflector output: lessons and follow-up planning for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub goal_status: String,
    pub lessons_learned: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub next_iteration_plan: String,
    pub knowledge_updates: Vec<String>,
    pub confidence: f64,
}

impl StageOutput for Reflection {
    fn clamp_scores(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_serializes_to_snake_case() {
        let json = serde_json::to_string(&Stage::Orchestrator).expect("serialize");
        assert_eq!(json, "\"orchestrator\"");
    }

    #[test]
    fn clamp_pulls_confidence_into_unit_range() {
        let mut decision = OrchestratorDecision {
            decision: "direct_execution".to_string(),
            reasoning: String::new(),
            next_steps: Vec::new(),
            confidence: 1.7,
        };
        decision.clamp_scores();
        assert_eq!(decision.confidence, 1.0);

        decision.confidence = -0.3;
        decision.clamp_scores();
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn clamp_bounds_quality_and_success_rate() {
        let mut validation = ValidationResult {
            validation_status: "passed".to_string(),
            quality_score: 12.0,
            issues_found: Vec::new(),
            recommendations: Vec::new(),
            compliance_check: "passed".to_string(),
        };
        validation.clamp_scores();
        assert_eq!(validation.quality_score, 1.0);

        let mut result = ExecutionResult {
            status: "completed".to_string(),
            executed_tasks: Vec::new(),
            generated_artifacts: Vec::new(),
            new_skills_created: Vec::new(),
            execution_metrics: ExecutionMetrics {
                duration_ms: 10,
                success_rate: -1.0,
            },
        };
        result.clamp_scores();
        assert_eq!(result.execution_metrics.success_rate, 0.0);
    }

    #[test]
    fn fallback_provenance_carries_reason() {
        let provenance = Provenance::Fallback {
            reason: "backend unreachable".to_string(),
        };
        assert!(provenance.is_fallback());
        assert_eq!(provenance.fallback_reason(), Some("backend unreachable"));
        assert!(!Provenance::Genuine.is_fallback());
    }
}
