//! Maker stage: carries out the execution plan.

use crate::contract;
use crate::core::fallback::maker_fallback;
use crate::core::types::{ExecutionResult, StageResult};
use crate::io::generator::{Generator, NamedParams};

const TEMPLATE_ID: &str = "maker-agent";
const OUTPUT_SCHEMA: &str = include_str!("../../schemas/execution_result.schema.json");

/// Input contract: the serialized plan plus goal and skills.
#[derive(Debug, Clone, Default)]
pub struct MakerInput {
    /// Canonical serialization of the planner's execution plan.
    pub execution_plan: String,
    pub goal: String,
    pub available_skills: String,
}

impl MakerInput {
    fn to_params(&self) -> NamedParams {
        let mut params = NamedParams::new();
        params.insert("execution_plan".to_string(), self.execution_plan.clone());
        params.insert("goal".to_string(), self.goal.clone());
        params.insert("available_skills".to_string(), self.available_skills.clone());
        params
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MakerAgent;

impl MakerAgent {
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        input: &MakerInput,
    ) -> StageResult<ExecutionResult> {
        contract::execute(
            generator,
            TEMPLATE_ID,
            &input.to_params(),
            OUTPUT_SCHEMA,
            maker_fallback(),
        )
    }
}
