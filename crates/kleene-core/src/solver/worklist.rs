//! FIFO worklist iteration over finite systems

use std::collections::VecDeque;
use std::hash::Hash;

use crate::assignment::{Assignment, InputAssignment, MutableAssignment};
use crate::system::FiniteEquationSystem;
use crate::tracer::FixpointSolverTracer;

/// Seeds a FIFO queue with every unknown and re-enqueues the dependents of
/// each change until the queue drains.
pub struct WorklistSolver;

impl WorklistSolver {
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
        let mut worklist: VecDeque<U> = eqs.unknowns().iter().cloned().collect();
        tracer.initialized(&rho);
        while let Some(x) = worklist.pop_front() {
            let new = eqs.apply(&rho, &x);
            tracer.evaluated(&rho, &x, &new);
            if new != rho.get(&x) {
                rho.set(x.clone(), new);
                worklist.extend(eqs.infl(&x));
            }
        }
        tracer.completed(&rho);
        rho
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::boxes::BoxAssignment;
    use crate::system::FiniteSystem;
    use crate::tracer::{CountingTracer, NullTracer};

    /// Each unknown counts itself up to a ceiling of 5.
    fn saturating_counters() -> FiniteSystem<u32, i64> {
        FiniteSystem::new(
            Body::<u32, i64>::from_fn(|rho, u| (rho.get(u) + 1).min(5)),
            InputAssignment::constant(0),
            (0..4).collect(),
            vec![],
            |u| vec![*u],
        )
        .unwrap()
    }

    #[test]
    fn test_counters_saturate() {
        let eqs = saturating_counters();
        let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
        for u in 0..4 {
            assert_eq!(rho.get(&u), 5);
        }
    }

    #[test]
    fn test_tracer_sees_every_evaluation() {
        let eqs = saturating_counters();
        let tracer = CountingTracer::new();
        let _ = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &tracer);
        // Five raising evaluations plus one stable one per unknown.
        assert_eq!(tracer.evaluations(), 24);
        assert_eq!(tracer.changes(), 20);
    }

    #[test]
    fn test_boxed_system_stabilizes_under_box() {
        // Body keeps incrementing; a widening box caps the chain.
        let eqs = FiniteSystem::new(
            Body::from_fn(|rho: &dyn Assignment<u32, i64>, u: &u32| rho.get(u).saturating_add(1)),
            InputAssignment::constant(0),
            vec![0],
            vec![],
            |_| vec![0],
        )
        .unwrap()
        .with_boxes(BoxAssignment::uniform(
            |_old: &i64, new: &i64| if *new > 3 { i64::MAX } else { *new },
            true,
        ));
        let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
        assert_eq!(rho.get(&0), i64::MAX);
    }
}
