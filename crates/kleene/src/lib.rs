//! # Kleene
//!
//! Umbrella crate for the `kleene` fixpoint-solving stack: re-exports the
//! core solver library and adds the observability helpers that do not
//! belong in it.
//!
//! ## Modules
//!
//! - **[`log`]** - tracer back-ends emitting `tracing` events
//! - **[`report`]** - serializable summaries of a solver run
//!
//! ## Quick Start
//!
//! ```rust
//! use kleene::prelude::*;
//!
//! let eqs = FiniteSystem::new(
//!     Body::from_fn(|rho: &dyn Assignment<u32, i64>, u: &u32| (rho.get(u) + 1).min(3)),
//!     InputAssignment::constant(0),
//!     vec![0, 1],
//!     vec![],
//!     |u| vec![*u],
//! )
//! .unwrap();
//!
//! let tracer = CountingTracer::new();
//! let solution = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &tracer);
//! let report = SolveReport::from_tracer(&tracer, &solution);
//! assert_eq!(solution.get(&0), 3);
//! assert_eq!(report.bindings, 2);
//! ```

pub mod log;
pub mod report;

pub use kleene_core::*;

pub use crate::log::{LoggingSolverTracer, LoggingSystemTracer};
pub use crate::report::SolveReport;

/// Prelude for convenient imports
pub mod prelude {
    pub use kleene_core::{
        warrowing, Assignment, Body, BoxAssignment, BoxFn, CadencedBoxes, CountingTracer, Domain,
        EdgeId, EdgeListGraph, EquationSystem, EquationSystemTracer, FiniteEquationSystem,
        FiniteSystem, FixpointSolverTracer, FnDomain, GraphBuilder, GraphSystem, InputAssignment,
        LocalSolver, Magma, MutableAssignment, NaturalOrder, NullTracer, PartialAssignment,
        PrioritySolver, RoundRobinSolver, SimpleSystem, UnknownOrder, WorklistSolver,
    };

    pub use crate::log::{LoggingSolverTracer, LoggingSystemTracer};
    pub use crate::report::SolveReport;
}
