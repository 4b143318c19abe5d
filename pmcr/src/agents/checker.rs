//! Checker stage: validates execution results against success criteria.

use crate::contract;
use crate::core::fallback::checker_fallback;
use crate::core::types::{StageResult, ValidationResult};
use crate::io::generator::{Generator, NamedParams};

const TEMPLATE_ID: &str = "checker-agent";
const OUTPUT_SCHEMA: &str = include_str!("../../schemas/validation_result.schema.json");

/// Input contract: serialized execution results plus criteria and artifacts.
#[derive(Debug, Clone, Default)]
pub struct CheckerInput {
    /// Canonical serialization of the maker's execution result.
    pub execution_results: String,
    pub success_criteria: String,
    pub generated_artifacts: String,
}

impl CheckerInput {
    fn to_params(&self) -> NamedParams {
        let mut params = NamedParams::new();
        params.insert("execution_results".to_string(), self.execution_results.clone());
        params.insert("success_criteria".to_string(), self.success_criteria.clone());
        params.insert(
            "generated_artifacts".to_string(),
            self.generated_artifacts.clone(),
        );
        params
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CheckerAgent;

impl CheckerAgent {
    pub fn run<G: Generator>(
        &self,
        generator: &G,
        input: &CheckerInput,
    ) -> StageResult<ValidationResult> {
        contract::execute(
            generator,
            TEMPLATE_ID,
            &input.to_params(),
            OUTPUT_SCHEMA,
            checker_fallback(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Provenance;
    use crate::test_support::{CapturingGenerator, FailingGenerator};

    #[test]
    fn checker_parses_validation_verdict() {
        let generator = CapturingGenerator::new(
            r#"{
                "validation_status": "passed_with_issues",
                "quality_score": 0.82,
                "issues_found": ["missing changelog"],
                "recommendations": ["add changelog"],
                "compliance_check": "passed"
            }"#,
        );
        let input = CheckerInput {
            execution_results: "{\"status\": \"completed\"}".to_string(),
            success_criteria: "all sections filled".to_string(),
            generated_artifacts: "outline.md".to_string(),
        };

        let result = CheckerAgent.run(&generator, &input);

        assert_eq!(result.provenance, Provenance::Genuine);
        assert_eq!(result.value.issues_found, vec!["missing changelog"]);
        let (template, params) = generator.last_invocation().expect("invoked");
        assert_eq!(template, "checker-agent");
        assert_eq!(
            params.get("success_criteria").map(String::as_str),
            Some("all sections filled")
        );
    }

    #[test]
    fn checker_fallback_passes_with_full_quality() {
        let generator = FailingGenerator::new("empty response");
        let result = CheckerAgent.run(&generator, &CheckerInput::default());
        assert!(result.provenance.is_fallback());
        assert_eq!(result.value, checker_fallback());
        assert_eq!(result.value.validation_status, "passed");
        assert_eq!(result.value.quality_score, 1.0);
        assert!(result.value.issues_found.is_empty());
    }
}
