//! Table-driven pipeline engine.
//!
//! One run walks the topology chain from start to terminal stage, feeding
//! each stage's typed output to its successor as canonical JSON. Stage
//! failures never stop the walk: the contract executor substitutes fallbacks,
//! so a run always reaches the terminal stage. Only infrastructure faults
//! (serialization of our own types) are run-fatal.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::checker::{CheckerAgent, CheckerInput};
use crate::agents::maker::{MakerAgent, MakerInput};
use crate::agents::orchestrator::{OrchestratorAgent, OrchestratorInput};
use crate::agents::planner::{PlannerAgent, PlannerInput};
use crate::agents::reflector::{ReflectorAgent, ReflectorInput};
use crate::core::fallback::reflector_fallback;
use crate::core::topology::Topology;
use crate::core::types::{
    ExecutionPlan, ExecutionResult, OrchestratorDecision, Provenance, Reflection, Stage,
    StageResult, ValidationResult,
};
use crate::io::audit::{AuditEntry, AuditSink};
use crate::io::config::RunDefaults;
use crate::io::generator::Generator;
use crate::io::knowledge::{KnowledgeEntry, KnowledgeSink};

/// Run-scoped input parameters. Shared by every stage of one run; never
/// mutated after the run starts.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub goal: String,
    pub context: String,
    pub priority: String,
    pub constraints: String,
    pub available_skills: String,
}

impl RunContext {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    /// Goal plus configured defaults for everything else.
    pub fn from_defaults(goal: &str, defaults: &RunDefaults) -> Self {
        Self {
            goal: goal.to_string(),
            context: defaults.context.clone(),
            priority: defaults.priority.clone(),
            constraints: defaults.constraints.clone(),
            available_skills: defaults.available_skills.clone(),
        }
    }
}

/// Where a run currently is in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Active(Stage),
    Complete,
}

/// One completed stage as it appears in the run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub provenance: Provenance,
    pub output: Value,
}

/// Full account of one pipeline run.
///
/// `transitions` counts stage executions (chain length); `stages` holds one
/// record per output-producing stage, in execution order. The typed fields
/// are `Some` when their stage was part of the chain.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub goal: String,
    pub state: RunPhase,
    pub transitions: u32,
    pub stages: Vec<StageRecord>,
    pub decision: Option<StageResult<OrchestratorDecision>>,
    pub plan: Option<StageResult<ExecutionPlan>>,
    pub execution: Option<StageResult<ExecutionResult>>,
    pub validation: Option<StageResult<ValidationResult>>,
    pub reflection: Option<StageResult<Reflection>>,
    pub knowledge: Option<KnowledgeEntry>,
}

impl RunReport {
    fn new(run_id: String, goal: String) -> Self {
        Self {
            run_id,
            goal,
            state: RunPhase::Idle,
            transitions: 0,
            stages: Vec::new(),
            decision: None,
            plan: None,
            execution: None,
            validation: None,
            reflection: None,
            knowledge: None,
        }
    }

    /// Number of stages that fell back in this run.
    pub fn fallback_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|record| record.provenance.is_fallback())
            .count()
    }
}

/// The pipeline engine: a validated topology plus the backends it drives.
///
/// The engine is stateless between runs; a single `Pipeline` may serve
/// concurrent runs as long as the generator and sinks are `Sync`.
pub struct Pipeline<'a, G, A, K> {
    topology: Topology,
    generator: &'a G,
    audit: &'a A,
    knowledge: &'a K,
}

impl<'a, G, A, K> Pipeline<'a, G, A, K>
where
    G: Generator,
    A: AuditSink,
    K: KnowledgeSink,
{
    pub fn new(topology: Topology, generator: &'a G, audit: &'a A, knowledge: &'a K) -> Self {
        Self {
            topology,
            generator,
            audit,
            knowledge,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Execute one run over the chain. Always reaches the terminal stage;
    /// stage-level failures surface as fallback provenance, not errors.
    pub fn run(&self, ctx: &RunContext) -> Result<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let mut report = RunReport::new(run_id, ctx.goal.clone());
        info!(run_id = %report.run_id, goal = %ctx.goal, "run started");

        let mut cursor = Some(self.topology.start());
        while let Some(stage) = cursor {
            report.state = RunPhase::Active(stage);
            report.transitions += 1;
            self.execute_stage(stage, ctx, &mut report)?;
            cursor = self.topology.successor(stage);
        }

        report.state = RunPhase::Complete;
        info!(
            run_id = %report.run_id,
            transitions = report.transitions,
            fallbacks = report.fallback_count(),
            "run complete"
        );
        Ok(report)
    }

    fn execute_stage(&self, stage: Stage, ctx: &RunContext, report: &mut RunReport) -> Result<()> {
        match stage {
            Stage::Orchestrator => {
                let input = OrchestratorInput {
                    goal: ctx.goal.clone(),
                    context: ctx.context.clone(),
                    priority: ctx.priority.clone(),
                    available_skills: ctx.available_skills.clone(),
                };
                let result = OrchestratorAgent.run(self.generator, &input);
                self.record(report, stage, &result.value, &result.provenance)?;
                report.decision = Some(result);
            }
            Stage::Planner => {
                let input = PlannerInput {
                    goal: ctx.goal.clone(),
                    available_skills: ctx.available_skills.clone(),
                    system_state: transport(report.decision.as_ref().map(|r| &r.value))?,
                    constraints: ctx.constraints.clone(),
                };
                let result = PlannerAgent.run(self.generator, &input);
                self.record(report, stage, &result.value, &result.provenance)?;
                report.plan = Some(result);
            }
            Stage::Maker => {
                let input = MakerInput {
                    execution_plan: transport(report.plan.as_ref().map(|r| &r.value))?,
                    goal: ctx.goal.clone(),
                    available_skills: ctx.available_skills.clone(),
                };
                let result = MakerAgent.run(self.generator, &input);
                self.record(report, stage, &result.value, &result.provenance)?;
                report.execution = Some(result);
            }
            Stage::Checker => {
                let input = CheckerInput {
                    execution_results: transport(report.execution.as_ref().map(|r| &r.value))?,
                    success_criteria: report
                        .plan
                        .as_ref()
                        .map(|r| {
                            r.value
                                .execution_plan
                                .iter()
                                .map(|task| task.success_criteria.as_str())
                                .collect::<Vec<_>>()
                                .join("\n")
                        })
                        .unwrap_or_default(),
                    generated_artifacts: report
                        .execution
                        .as_ref()
                        .map(|r| r.value.generated_artifacts.join("\n"))
                        .unwrap_or_default(),
                };
                let result = CheckerAgent.run(self.generator, &input);
                self.record(report, stage, &result.value, &result.provenance)?;
                report.validation = Some(result);
            }
            Stage::Reflector => {
                let input = ReflectorInput {
                    original_goal: ctx.goal.clone(),
                    execution_results: transport(report.validation.as_ref().map(|r| &r.value))?,
                    performance_metrics: transport(
                        report.execution.as_ref().map(|r| &r.value.execution_metrics),
                    )?,
                    issues_encountered: report
                        .validation
                        .as_ref()
                        .map(|r| r.value.issues_found.join("\n"))
                        .unwrap_or_default(),
                    user_feedback: String::new(),
                };
                let result = ReflectorAgent.run(self.generator, &input);
                self.record(report, stage, &result.value, &result.provenance)?;
                report.reflection = Some(result);
            }
            Stage::Knowledge => {
                let reflection = report
                    .reflection
                    .as_ref()
                    .map(|r| r.value.clone())
                    .unwrap_or_else(reflector_fallback);
                let artifact_text = report
                    .execution
                    .as_ref()
                    .filter(|r| !r.value.generated_artifacts.is_empty())
                    .map(|r| r.value.generated_artifacts.join("\n"))
                    .unwrap_or_else(|| ctx.goal.clone());
                let entry = KnowledgeEntry::from_artifact(&artifact_text, &reflection);
                if let Err(err) = self.knowledge.append(&entry) {
                    warn!(
                        run_id = %report.run_id,
                        error = %format!("{err:#}"),
                        "knowledge append failed"
                    );
                }
                self.record(report, stage, &entry, &Provenance::Genuine)?;
                report.knowledge = Some(entry);
            }
            Stage::Audit => {
                // Terminal stage. Run closure was already recorded by the
                // routing entry of its predecessor; nothing left to emit.
                info!(run_id = %report.run_id, "audit stage reached, run closing");
            }
        }
        Ok(())
    }

    /// Push the stage record and append its audit entry. Audit failures are
    /// surfaced and swallowed; a lost entry never fails the run.
    fn record<T: Serialize>(
        &self,
        report: &mut RunReport,
        stage: Stage,
        value: &T,
        provenance: &Provenance,
    ) -> Result<()> {
        let output =
            serde_json::to_value(value).with_context(|| format!("serialize {stage} output"))?;
        report.stages.push(StageRecord {
            stage,
            provenance: provenance.clone(),
            output,
        });

        let details = match provenance.fallback_reason() {
            Some(reason) => format!("provenance=fallback reason={reason}"),
            None => "provenance=genuine".to_string(),
        };
        let entry = AuditEntry::stage_completed(&report.run_id, stage, details);
        if let Err(err) = self.audit.append(&entry) {
            warn!(
                run_id = %report.run_id,
                stage = %stage,
                error = %format!("{err:#}"),
                "audit append failed"
            );
        }
        Ok(())
    }
}

/// Canonical inter-stage transport: pretty JSON of the upstream value, or the
/// empty string when the chain has no such upstream stage.
fn transport<T: Serialize>(value: Option<&T>) -> Result<String> {
    match value {
        Some(value) => serde_json::to_string_pretty(value).context("serialize stage transport"),
        None => Ok(String::new()),
    }
}
