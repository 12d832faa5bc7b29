//! On-demand iteration over unbounded unknown spaces

use std::collections::VecDeque;
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::assignment::{Assignment, InputAssignment, MutableAssignment};
use crate::system::EquationSystem;
use crate::tracer::FixpointSolverTracer;

/// Solves only the part of the system reachable from a wanted set.
///
/// The unknown space is never enumerated: dependencies reported by
/// [`EquationSystem::apply_with_dependencies`] are materialized at their
/// start value, enqueued for a first evaluation, and recorded in an
/// incrementally built influence map. The returned assignment is total over
/// every unknown reachable from `wanted`.
pub struct LocalSolver;

impl LocalSolver {
    pub fn solve<U, V, S, T>(
        eqs: &S,
        wanted: &[U],
        start: InputAssignment<U, V>,
        tracer: &T,
    ) -> MutableAssignment<U, V>
    where
        U: Clone + Eq + Hash,
        V: Clone + PartialEq,
        S: EquationSystem<U, V>,
        T: FixpointSolverTracer<U, V>,
    {
        let eqs = eqs.for_solving();
        let mut rho = MutableAssignment::new(start.clone());
        let mut infl: IndexMap<U, IndexSet<U>> = IndexMap::new();
        let mut worklist: VecDeque<U> = wanted.iter().cloned().collect();
        tracer.initialized(&rho);
        while let Some(x) = worklist.pop_front() {
            let (new, deps) = eqs.apply_with_dependencies(&rho, &x);
            tracer.evaluated(&rho, &x, &new);
            for y in deps {
                if !rho.is_defined_at(&y) {
                    rho.set(y.clone(), start.get(&y));
                    worklist.push_back(y.clone());
                }
                infl.entry(y).or_default().insert(x.clone());
            }
            if new != rho.get(&x) {
                rho.set(x.clone(), new);
                if let Some(dependents) = infl.get(&x) {
                    worklist.extend(dependents.iter().cloned());
                }
            }
        }
        tracer.completed(&rho);
        rho
    }
}
