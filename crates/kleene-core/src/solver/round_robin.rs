//! Plain chaotic iteration: sweep everything until nothing moves

use std::hash::Hash;

use crate::assignment::{Assignment, InputAssignment, MutableAssignment};
use crate::system::FiniteEquationSystem;
use crate::tracer::FixpointSolverTracer;

/// Re-evaluates every unknown in enumeration order, pass after pass, until
/// a full pass changes nothing. Ignores the influence relation; the
/// baseline the worklist solvers improve on, and occasionally the faster
/// choice on small dense systems.
pub struct RoundRobinSolver;

impl RoundRobinSolver {
    pub fn solve<U, V, S, T>(
        eqs: &S,
        start: InputAssignment<U, V>,
        tracer: &T,
    ) -> MutableAssignment<U, V>
    where
        U: Clone + Eq + Hash,
        V: Clone + PartialEq,
        S: FiniteEquationSystem<U, V>,
        T: FixpointSolverTracer<U, V>,
    {
        let eqs = eqs.for_solving();
        let mut rho = MutableAssignment::new(start);
        tracer.initialized(&rho);
        let mut dirty = true;
        while dirty {
            dirty = false;
            for x in eqs.unknowns() {
                let new = eqs.apply(&rho, x);
                tracer.evaluated(&rho, x, &new);
                if new != rho.get(x) {
                    rho.set(x.clone(), new);
                    dirty = true;
                }
            }
        }
        tracer.completed(&rho);
        rho
    }
}
