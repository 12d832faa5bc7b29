//! Serializable summaries of a solver run

use std::hash::Hash;

use kleene_core::{CountingTracer, MutableAssignment};
use serde::{Deserialize, Serialize};

/// What one solve cost and produced, in numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Right-hand-side evaluations performed.
    pub evaluations: usize,
    /// Evaluations whose result differed from the stored value.
    pub changes: usize,
    /// Explicit bindings in the final assignment.
    pub bindings: usize,
}

impl SolveReport {
    pub fn from_tracer<U: Eq + Hash, V: Clone>(
        tracer: &CountingTracer,
        solution: &MutableAssignment<U, V>,
    ) -> Self {
        Self {
            evaluations: tracer.evaluations(),
            changes: tracer.changes(),
            bindings: solution.len(),
        }
    }

    /// Evaluations that confirmed stability instead of making progress.
    pub fn stable_evaluations(&self) -> usize {
        self.evaluations - self.changes
    }
}
