//! Planner stage: turns a routing decision into an ordered execution plan.

use crate::contract;
use crate::core::fallback::planner_fallback;
use crate::core::types::{ExecutionPlan, StageResult};
use crate::io::generator::{Generator, NamedParams};

const TEMPLATE_ID: &str = "planner-agent";
const OUTPUT_SCHEMA: &str = include_str!("../../schemas/execution_plan.schema.json");

/// Input contract: goal plus the serialized upstream decision as system state.
#[derive(Debug, Clone, Default)]
pub struct PlannerInput {
    pub goal: String,
    pub available_skills: String,
    /// Canonical serialization of the orchestrator's decision.
    pub system_state: String,
    pub constraints: String,
}

impl PlannerInput {
    fn to_params(&self) -> NamedParams {
        let mut params = NamedParams::new();
        params.insert("goal".to_string(), self.goal.clone());
        params.insert("available_skills".to_string(), self.available_skills.clone());
        params.insert("system_state".to_string(), self.system_state.clone());
        params.insert("constraints".to_string(), self.constraints.clone());
        params
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlannerAgent;

impl PlannerAgent {
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        input: &PlannerInput,
    ) -> StageResult<ExecutionPlan> {
        contract::execute(
            generator,
            TEMPLATE_ID,
            &input.to_params(),
            OUTPUT_SCHEMA,
            planner_fallback(),
        )
    }
}
