//! Orchestrator stage: decides how the goal should be pursued.

use crate::contract;
use crate::core::fallback::orchestrator_fallback;
use crate::core::types::{OrchestratorDecision, StageResult};
use crate::io::generator::{Generator, NamedParams};

const TEMPLATE_ID: &str = "orchestrator-agent";
const OUTPUT_SCHEMA: &str = include_str!("../../schemas/orchestrator_decision.schema.json");

/// Input contract: goal plus run-scoped routing context.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorInput {
    pub goal: String,
    pub context: String,
    pub priority: String,
    pub available_skills: String,
}

impl OrchestratorInput {
    fn to_params(&self) -> NamedParams {
        let mut params = NamedParams::new();
        params.insert("goal".to_string(), self.goal.clone());
        params.insert("context".to_string(), self.context.clone());
        params.insert("priority".to_string(), self.priority.clone());
        params.insert("available_skills".to_string(), self.available_skills.clone());
        params
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrchestratorAgent;

impl OrchestratorAgent {
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        input: &OrchestratorInput,
    ) -> StageResult<OrchestratorDecision> {
        contract::execute(
            generator,
            TEMPLATE_ID,
            &input.to_params(),
            OUTPUT_SCHEMA,
            orchestrator_fallback(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Provenance;
    use crate::test_support::CapturingGenerator;

    #[test]
    fn orchestrator_sends_template_and_named_params() {
        let generator = CapturingGenerator::new(
            r#"{"decision": "delegate", "reasoning": "r", "next_steps": ["plan"], "confidence": 0.8}"#,
        );
        let input = OrchestratorInput {
            goal: "Generate documentation".to_string(),
            context: "fresh run".to_string(),
            priority: "high".to_string(),
            available_skills: "writing".to_string(),
        };

        let result = OrchestratorAgent.run(&generator, &input);

        assert_eq!(result.provenance, Provenance::Genuine);
        assert_eq!(result.value.decision, "delegate");
        let (template, params) = generator.last_invocation().expect("invoked");
        assert_eq!(template, "orchestrator-agent");
        assert_eq!(params.get("goal").map(String::as_str), Some("Generate documentation"));
        assert_eq!(params.get("priority").map(String::as_str), Some("high"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn orchestrator_falls_back_on_unusable_response() {
        let generator = CapturingGenerator::new("no json at all");
        let result = OrchestratorAgent.run(&generator, &OrchestratorInput::default());
        assert!(result.provenance.is_fallback());
        assert_eq!(result.value, orchestrator_fallback());
        assert_eq!(result.value.confidence, 0.5);
    }
}
