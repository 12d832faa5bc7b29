//! Worklist-based fixpoint solvers
//!
//! Four iteration strategies over one contract: starting from a given
//! assignment, re-evaluate unknowns until every stored value equals its
//! right-hand side (after box application, if any). Termination is the
//! caller's bargain: the combined body-plus-box chain on `V` must
//! stabilize from the start assignment, which is what widening boxes are
//! for.
//!
//! - [`RoundRobinSolver`]: full sweeps over the unknown set until a pass
//!   changes nothing.
//! - [`WorklistSolver`]: FIFO, propagating only along the influence
//!   relation.
//! - [`PrioritySolver`]: highest-unknown-first with restart semantics.
//! - [`LocalSolver`]: discovers the relevant unknowns on demand from a
//!   wanted set; the only solver that works on unbounded unknown spaces.
//!
//! Worklists may contain duplicates; convergence does not rely on
//! uniqueness. Every solver takes its own per-solve system instance
//! through [`crate::system::EquationSystem::for_solving`], so stateful box
//! assignments start from pristine counters, and owns its mutable
//! assignment until it returns it.

mod local;
mod priority;
mod round_robin;
mod worklist;

pub use local::LocalSolver;
pub use priority::PrioritySolver;
pub use round_robin::RoundRobinSolver;
pub use worklist::WorklistSolver;
