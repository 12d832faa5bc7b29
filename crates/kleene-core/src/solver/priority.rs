//! Priority-driven iteration with restart semantics

use std::hash::Hash;

use crate::algebra::UnknownOrder;
use crate::assignment::{Assignment, InputAssignment, MutableAssignment};
use crate::system::FiniteEquationSystem;
use crate::tracer::FixpointSolverTracer;

/// A worklist solver that always evaluates the greatest pending unknown
/// under a caller-supplied order.
///
/// After computing a new value for `x`, the `restart` predicate is consulted
/// with the new and the previously stored value. When it answers true, every
/// unknown strictly above `x` is reset to its start value; the worklist is
/// left alone, those unknowns are re-enqueued as their dependencies fire
/// again. The usual update and influence propagation follow either way.
pub struct PrioritySolver;

impl PrioritySolver {
    pub fn solve<U, V, S, O, R, T>(
        eqs: &S,
        start: InputAssignment<U, V>,
        ord: &O,
        restart: R,
        tracer: &T,
    ) -> MutableAssignment<U, V>
    where
        U: Clone + Eq + Hash,
        V: Clone + PartialEq,
        S: FiniteEquationSystem<U, V>,
        O: UnknownOrder<U>,
        R: Fn(&V, &V) -> bool,
        T: FixpointSolverTracer<U, V>,
    {
        let eqs = eqs.for_solving();
        let mut rho = MutableAssignment::new(start.clone());
        let mut heap = WitnessHeap::default();
        for u in eqs.unknowns() {
            heap.push(u.clone(), ord);
        }
        tracer.initialized(&rho);
        while let Some(x) = heap.pop(ord) {
            let old = rho.get(&x);
            let new = eqs.apply(&rho, &x);
            tracer.evaluated(&rho, &x, &new);
            if restart(&new, &old) {
                for y in eqs.unknowns() {
                    if ord.gt(y, &x) {
                        rho.set(y.clone(), start.get(y));
                    }
                }
            }
            if new != old {
                rho.set(x.clone(), new);
                for y in eqs.infl(&x) {
                    heap.push(y, ord);
                }
            }
        }
        tracer.completed(&rho);
        rho
    }
}

/// A binary max-heap ordered through an [`UnknownOrder`] witness rather
/// than `Ord`, since the priority of an unknown is a solve parameter.
/// Duplicates are allowed.
struct WitnessHeap<U> {
    items: Vec<U>,
}

impl<U> Default for WitnessHeap<U> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<U> WitnessHeap<U> {
    fn push<O: UnknownOrder<U> + ?Sized>(&mut self, item: U, ord: &O) {
        self.items.push(item);
        let mut i = self.items.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if ord.gt(&self.items[i], &self.items[parent]) {
                self.items.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn pop<O: UnknownOrder<U> + ?Sized>(&mut self, ord: &O) -> Option<U> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let top = self.items.pop();
        let mut i = 0;
        loop {
            let (left, right) = (2 * i + 1, 2 * i + 2);
            let mut largest = i;
            if left < self.items.len() && ord.gt(&self.items[left], &self.items[largest]) {
                largest = left;
            }
            if right < self.items.len() && ord.gt(&self.items[right], &self.items[largest]) {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.items.swap(i, largest);
            i = largest;
        }
        top
    }
}
