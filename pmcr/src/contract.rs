//! The resilient execution contract shared by every agent stage.
//!
//! One generative call, one chance: the raw response is stripped of prose,
//! validated against the stage's JSON Schema, and deserialized into the typed
//! output. Any failure along that path substitutes the stage's statically
//! declared fallback, annotated with the triggering error. The executor never
//! propagates a failure to the caller; its job is to guarantee forward
//! progress. Retry policy, if any, belongs to the caller.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::Draft;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::extract::extract_payload;
use crate::core::types::{Provenance, StageOutput, StageResult};
use crate::io::generator::{Generator, NamedParams};

/// Execute one stage contract.
///
/// `schema_json` is the stage's embedded JSON Schema source; `fallback` must
/// itself satisfy that schema. Scores are clamped on both the genuine and the
/// fallback path, so the returned value is always range-valid.
pub fn execute<G: Generator, T: StageOutput>(
    generator: &G,
    template_id: &str,
    params: &NamedParams,
    schema_json: &str,
    fallback: T,
) -> StageResult<T> {
    match attempt::<G, T>(generator, template_id, params, schema_json) {
        Ok(mut value) => {
            value.clamp_scores();
            debug!(template_id, "stage contract satisfied");
            StageResult {
                value,
                provenance: Provenance::Genuine,
            }
        }
        Err(err) => {
            let reason = format!("{err:#}");
            warn!(template_id, %reason, "stage contract failed, using fallback");
            let mut value = fallback;
            value.clamp_scores();
            StageResult {
                value,
                provenance: Provenance::Fallback { reason },
            }
        }
    }
}

fn attempt<G: Generator, T: StageOutput>(
    generator: &G,
    template_id: &str,
    params: &NamedParams,
    schema_json: &str,
) -> Result<T> {
    let raw = generator
        .invoke(template_id, params)
        .context("invoke generator")?;
    let payload = extract_payload(&raw)
        .ok_or_else(|| anyhow!("no structured payload found in response"))?;
    let instance: Value = serde_json::from_str(payload).context("parse payload as json")?;
    validate_schema(&instance, schema_json)?;
    serde_json::from_value(instance).context("deserialize stage output")
}

/// Validate a JSON instance against a JSON Schema (Draft 2020-12).
fn validate_schema(instance: &Value, schema_json: &str) -> Result<()> {
    let schema: Value = serde_json::from_str(schema_json).context("parse stage schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile stage schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("schema validation failed:\n- {}", messages.join("\n- "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::orchestrator_fallback;
    use crate::core::types::OrchestratorDecision;
    use crate::test_support::{FailingGenerator, ScriptedGenerator};

    const SCHEMA: &str = include_str!("../schemas/orchestrator_decision.schema.json");

    fn genuine_payload() -> &'static str {
        r#"{
            "decision": "delegate_to_planner",
            "reasoning": "multi-step goal",
            "next_steps": ["plan", "execute"],
            "confidence": 0.9
        }"#
    }

    #[test]
    fn parses_bare_payload() {
        let generator = ScriptedGenerator::always(genuine_payload());
        let result: StageResult<OrchestratorDecision> = execute(
            &generator,
            "orchestrator-agent",
            &NamedParams::new(),
            SCHEMA,
            orchestrator_fallback(),
        );
        assert_eq!(result.provenance, Provenance::Genuine);
        assert_eq!(result.value.decision, "delegate_to_planner");
    }

    #[test]
    fn prose_wrapping_is_lossless_for_the_payload() {
        let wrapped = format!(
            "Of course! Here is my decision:\n```json\n{}\n```\nHope that helps.",
            genuine_payload()
        );
        let bare = ScriptedGenerator::always(genuine_payload());
        let noisy = ScriptedGenerator::always(&wrapped);

        let from_bare: StageResult<OrchestratorDecision> = execute(
            &bare,
            "orchestrator-agent",
            &NamedParams::new(),
            SCHEMA,
            orchestrator_fallback(),
        );
        let from_noisy: StageResult<OrchestratorDecision> = execute(
            &noisy,
            "orchestrator-agent",
            &NamedParams::new(),
            SCHEMA,
            orchestrator_fallback(),
        );
        assert_eq!(from_bare, from_noisy);
    }

    #[test]
    fn call_failure_substitutes_annotated_fallback() {
        let generator = FailingGenerator::new("backend unreachable");
        let result: StageResult<OrchestratorDecision> = execute(
            &generator,
            "orchestrator-agent",
            &NamedParams::new(),
            SCHEMA,
            orchestrator_fallback(),
        );
        assert_eq!(result.value, orchestrator_fallback());
        let reason = result.provenance.fallback_reason().expect("fallback");
        assert!(reason.contains("backend unreachable"));
    }

    #[test]
    fn missing_payload_substitutes_fallback() {
        let generator = ScriptedGenerator::always("I could not produce a decision, sorry.");
        let result: StageResult<OrchestratorDecision> = execute(
            &generator,
            "orchestrator-agent",
            &NamedParams::new(),
            SCHEMA,
            orchestrator_fallback(),
        );
        assert!(result.provenance.is_fallback());
        assert_eq!(result.value, orchestrator_fallback());
        let reason = result.provenance.fallback_reason().expect("fallback");
        assert!(reason.contains("no structured payload"));
    }

    #[test]
    fn missing_required_field_substitutes_fallback() {
        // `confidence` is required by the schema.
        let generator = ScriptedGenerator::always(
            r#"{"decision": "x", "reasoning": "y", "next_steps": []}"#,
        );
        let result: StageResult<OrchestratorDecision> = execute(
            &generator,
            "orchestrator-agent",
            &NamedParams::new(),
            SCHEMA,
            orchestrator_fallback(),
        );
        assert!(result.provenance.is_fallback());
        let reason = result.provenance.fallback_reason().expect("fallback");
        assert!(reason.contains("schema validation failed"));
    }

    #[test]
    fn genuine_scores_are_clamped() {
        let generator = ScriptedGenerator::always(
            r#"{"decision": "x", "reasoning": "y", "next_steps": [], "confidence": 7.5}"#,
        );
        let result: StageResult<OrchestratorDecision> = execute(
            &generator,
            "orchestrator-agent",
            &NamedParams::new(),
            SCHEMA,
            orchestrator_fallback(),
        );
        assert_eq!(result.provenance, Provenance::Genuine);
        assert_eq!(result.value.confidence, 1.0);
    }
}
