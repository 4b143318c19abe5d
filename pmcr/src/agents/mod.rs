//! The five agent stages of the pipeline chain.
//!
//! Each stage owns its template id, embedded output schema, typed input
//! contract and fallback, and makes exactly one pass through the contract
//! executor. Stages never block on anything but that single call.

pub mod checker;
pub mod maker;
pub mod orchestrator;
pub mod planner;
pub mod reflector;

#[cfg(test)]
mod tests {
    use jsonschema::Draft;
    use serde_json::Value;

    use crate::core::fallback::{AGENT_STAGES, fallback_json};
    use crate::core::types::Stage;

    fn schema_for(stage: Stage) -> &'static str {
        match stage {
            Stage::Orchestrator => include_str!("../../schemas/orchestrator_decision.schema.json"),
            Stage::Planner => include_str!("../../schemas/execution_plan.schema.json"),
            Stage::Maker => include_str!("../../schemas/execution_result.schema.json"),
            Stage::Checker => include_str!("../../schemas/validation_result.schema.json"),
            Stage::Reflector => include_str!("../../schemas/reflection.schema.json"),
            Stage::Knowledge | Stage::Audit => unreachable!("no backend schema"),
        }
    }

    /// Every statically declared fallback must satisfy its stage's schema:
    /// the graph never forwards a malformed payload, even on total backend
    /// failure. No backend call involved.
    #[test]
    fn every_fallback_satisfies_its_stage_schema() {
        for stage in AGENT_STAGES {
            let schema: Value =
                serde_json::from_str(schema_for(stage)).expect("parse stage schema");
            let compiled = jsonschema::options()
                .with_draft(Draft::Draft202012)
                .build(&schema)
                .expect("compile stage schema");
            let fallback = fallback_json(stage).expect("fallback declared");
            let errors: Vec<String> = compiled
                .iter_errors(&fallback)
                .map(|err| err.to_string())
                .collect();
            assert!(errors.is_empty(), "{stage}: {errors:?}");
        }
    }
}
