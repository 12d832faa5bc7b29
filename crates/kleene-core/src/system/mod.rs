//! Equation systems and their decorations
//!
//! A system couples a right-hand side with an initial assignment and an
//! input predicate, and is closed under a small algebra of non-destructive
//! decorations: base assignments, per-unknown boxes, localized boxes and
//! warrowing on hyper-graph presentations, and tracers.
//!
//! - [`SimpleSystem`]: a body over an arbitrary (possibly unbounded)
//!   unknown set; dependencies discovered through a recording proxy.
//! - [`FiniteSystem`]: adds an enumerated unknown set and a static
//!   influence relation.
//! - [`GraphSystem`]: derives body and influence from a directed
//!   hyper-graph; the only presentation that supports localized boxes.

mod graph;
mod simple;

pub use graph::{
    EdgeId, EdgeListGraph, EquationGraph, FnGraph, GraphBuilder, GraphSystem, LocalizedGraph,
};
pub use simple::{FiniteSystem, SimpleSystem};

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use thiserror::Error;

use crate::assignment::{Assignment, DependencySet, InputAssignment};

/// Construction-time failures. Everything else in this crate is
/// infallible by contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemError {
    /// Finite systems require `inputs ⊆ unknowns`.
    #[error("input unknown {unknown} is not in the system's unknown set")]
    InputOutsideUnknowns { unknown: String },
}

/// An equation system `x = F_x(ρ)` over unknowns `U` and values `V`.
pub trait EquationSystem<U, V> {
    /// Evaluates the right-hand side of `u` on a snapshot `rho`.
    fn apply(&self, rho: &dyn Assignment<U, V>, u: &U) -> V;

    /// Like [`apply`](Self::apply), also reporting every unknown whose value
    /// in `rho` was consulted. Supersets are allowed; an under-approximation
    /// is a contract violation.
    fn apply_with_dependencies(&self, rho: &dyn Assignment<U, V>, u: &U) -> (V, DependencySet<U>);

    /// The assignment iteration conventionally starts from.
    fn initial(&self) -> &InputAssignment<U, V>;

    /// Whether `u` is an input unknown of the analyzed problem.
    fn is_input(&self, u: &U) -> bool;

    /// The per-solve instance a solver iterates on. Deep-copies stateful
    /// box assignments so that concurrent or repeated solves of the same
    /// system never share counters.
    fn for_solving(&self) -> Self
    where
        Self: Sized;
}

/// An equation system whose unknowns can be enumerated and whose influence
/// relation is known statically.
pub trait FiniteEquationSystem<U, V>: EquationSystem<U, V> {
    fn unknowns(&self) -> &[U];

    /// The unknowns whose right-hand sides may change when `ρ(u)` changes.
    fn infl(&self, u: &U) -> Vec<U>;
}

pub(crate) fn check_inputs_within<U>(unknowns: &[U], inputs: &[U]) -> Result<(), SystemError>
where
    U: Eq + Hash + fmt::Debug,
{
    let universe: HashSet<&U> = unknowns.iter().collect();
    for input in inputs {
        if !universe.contains(input) {
            return Err(SystemError::InputOutsideUnknowns {
                unknown: format!("{input:?}"),
            });
        }
    }
    Ok(())
}
