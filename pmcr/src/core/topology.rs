//! Fixed routing table for the pipeline graph.
//!
//! The topology is a declarative adjacency table built once at startup and
//! shared read-only across runs. Misconfiguration (unknown successor, cycle,
//! unreachable stage) is rejected here, before any run starts; the run-time
//! engine in [`crate::run`] can then walk the table without dynamic checks.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::types::Stage;

/// Graph-construction failure. Fatal: no run may start on a bad topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("stage `{stage}` is wired more than once")]
    DuplicateStage { stage: Stage },
    #[error("stage `{stage}` is wired to undeclared successor `{successor}`")]
    UnknownSuccessor { stage: Stage, successor: Stage },
    #[error("start stage `{start}` is not declared in the table")]
    UnknownStart { start: Stage },
    #[error("cycle detected: stage `{stage}` is reachable twice from the start")]
    Cycle { stage: Stage },
    #[error("stage `{stage}` is declared but unreachable from the start")]
    Unreachable { stage: Stage },
}

/// Immutable stage adjacency table. `None` marks the terminal stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    start: Stage,
    successors: BTreeMap<Stage, Option<Stage>>,
}

impl Topology {
    /// Build and validate a topology from `(stage, successor)` edges.
    ///
    /// Rejects duplicate wiring, successors that are not themselves declared,
    /// cycles, and declared-but-unreachable stages. The chain must end at a
    /// stage wired to `None`.
    pub fn new(start: Stage, edges: &[(Stage, Option<Stage>)]) -> Result<Self, TopologyError> {
        let mut successors = BTreeMap::new();
        for &(stage, successor) in edges {
            if successors.insert(stage, successor).is_some() {
                return Err(TopologyError::DuplicateStage { stage });
            }
        }
        for (&stage, &successor) in &successors {
            if let Some(successor) = successor
                && !successors.contains_key(&successor)
            {
                return Err(TopologyError::UnknownSuccessor { stage, successor });
            }
        }
        if !successors.contains_key(&start) {
            return Err(TopologyError::UnknownStart { start });
        }

        // Walk from the start; every declared stage must be visited exactly once.
        let mut visited = Vec::new();
        let mut cursor = Some(start);
        while let Some(stage) = cursor {
            if visited.contains(&stage) {
                return Err(TopologyError::Cycle { stage });
            }
            visited.push(stage);
            cursor = successors.get(&stage).copied().flatten();
        }
        for &stage in successors.keys() {
            if !visited.contains(&stage) {
                return Err(TopologyError::Unreachable { stage });
            }
        }

        Ok(Self { start, successors })
    }

    /// The baseline linear chain: Orchestrator through Reflector, then the
    /// knowledge stage, closed by the terminal audit stage.
    pub fn baseline() -> Self {
        // Statically known-good; `baseline_is_valid` guards this invariant.
        let mut successors = BTreeMap::new();
        successors.insert(Stage::Orchestrator, Some(Stage::Planner));
        successors.insert(Stage::Planner, Some(Stage::Maker));
        successors.insert(Stage::Maker, Some(Stage::Checker));
        successors.insert(Stage::Checker, Some(Stage::Reflector));
        successors.insert(Stage::Reflector, Some(Stage::Knowledge));
        successors.insert(Stage::Knowledge, Some(Stage::Audit));
        successors.insert(Stage::Audit, None);
        Self {
            start: Stage::Orchestrator,
            successors,
        }
    }

    pub fn start(&self) -> Stage {
        self.start
    }

    /// Successor of `stage`; `None` when `stage` is terminal.
    pub fn successor(&self, stage: Stage) -> Option<Stage> {
        self.successors.get(&stage).copied().flatten()
    }

    /// Stages in execution order, start to terminal.
    pub fn chain(&self) -> Vec<Stage> {
        let mut out = Vec::with_capacity(self.successors.len());
        let mut cursor = Some(self.start);
        while let Some(stage) = cursor {
            out.push(stage);
            cursor = self.successor(stage);
        }
        out
    }

    /// Number of stages in the chain.
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }
}
