//! Fixpoint solving for equation systems over user-defined lattices
//!
//! Static analyzers phrase their problem as a system of recursive equations
//! `x = F_x(ρ)` over an abstract domain and ask this crate for the least
//! (or an upper) solution. The crate provides:
//!
//! - Assignments from unknowns to values: immutable inputs, partial maps,
//!   and the mutable working state a solver iterates on
//! - Bodies (right-hand sides) and their decoration algebra: base
//!   assignments and per-unknown widening/narrowing boxes
//! - Equation systems over arbitrary, finite, or hyper-graph-shaped unknown
//!   sets, including localized boxes and warrowing on graphs
//! - Worklist-based solvers: round-robin, FIFO, priority-with-restart, and
//!   an on-demand solver for unbounded unknown spaces
//! - Elidable tracer hooks for observing evaluations and solver progress
//!
//! Concrete abstract domains, CFG construction, and front-end plumbing are
//! the consumer's business; the value and unknown types stay opaque here
//! and capabilities on them are passed in as explicit witnesses.
//!
//! ```
//! use kleene_core::{
//!     Assignment, Body, FiniteSystem, InputAssignment, NullTracer, WorklistSolver,
//! };
//!
//! // Four counters, each saturating at 5.
//! let eqs = FiniteSystem::new(
//!     Body::from_fn(|rho: &dyn Assignment<u32, i64>, u: &u32| (rho.get(u) + 1).min(5)),
//!     InputAssignment::constant(0),
//!     (0..4).collect(),
//!     vec![],
//!     |u| vec![*u],
//! )
//! .unwrap();
//! let solution = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
//! assert_eq!(solution.get(&3), 5);
//! ```

pub mod algebra;
pub mod assignment;
pub mod body;
pub mod boxes;
pub mod solver;
pub mod system;
pub mod tracer;

pub use algebra::{Domain, FnDomain, Magma, NaturalOrder, UnknownOrder};
pub use assignment::{
    Assignment, DependencySet, InputAssignment, MutableAssignment, PartialAssignment,
    TrackingAssignment,
};
pub use body::Body;
pub use boxes::{warrowing, BoxAssignment, BoxFn, CadencedBoxes, StatefulBoxes};
pub use solver::{LocalSolver, PrioritySolver, RoundRobinSolver, WorklistSolver};
pub use system::{
    EdgeId, EdgeListGraph, EquationGraph, EquationSystem, FiniteEquationSystem, FiniteSystem,
    FnGraph, GraphBuilder, GraphSystem, LocalizedGraph, SimpleSystem, SystemError,
};
pub use tracer::{CountingTracer, EquationSystemTracer, FixpointSolverTracer, NullTracer};
