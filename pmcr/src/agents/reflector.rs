//! Reflector stage: distills lessons and follow-up plans from the run.

use crate::contract;
use crate::core::fallback::reflector_fallback;
use crate::core::types::{Reflection, StageResult};
use crate::io::generator::{Generator, NamedParams};

const TEMPLATE_ID: &str = "reflector-agent";
const OUTPUT_SCHEMA: &str = include_str!("../../schemas/reflection.schema.json");

/// Input contract: the original goal plus validation and feedback signals.
#[derive(Debug, Clone, Default)]
pub struct ReflectorInput {
    pub original_goal: String,
    /// Canonical serialization of the checker's validation result.
    pub execution_results: String,
    pub performance_metrics: String,
    pub issues_encountered: String,
    pub user_feedback: String,
}

impl ReflectorInput {
    fn to_params(&self) -> NamedParams {
        let mut params = NamedParams::new();
        params.insert("original_goal".to_string(), self.original_goal.clone());
        params.insert("execution_results".to_string(), self.execution_results.clone());
        params.insert(
            "performance_metrics".to_string(),
            self.performance_metrics.clone(),
        );
        params.insert("issues_encountered".to_string(), self.issues_encountered.clone());
        params.insert("user_feedback".to_string(), self.user_feedback.clone());
        params
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectorAgent;

impl ReflectorAgent {
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        input: &ReflectorInput,
    ) -> StageResult<Reflection> {
        contract::execute(
            generator,
            TEMPLATE_ID,
            &input.to_params(),
            OUTPUT_SCHEMA,
            reflector_fallback(),
        )
    }
}
