//! Tracer back-ends over `tracing`
//!
//! Drop-in listeners for debugging a solve interactively: per-evaluation
//! events go to `trace`, run-level events to `debug`. Production builds
//! keep using [`NullTracer`](kleene_core::NullTracer) (or compile the
//! system-side hooks out entirely).

use std::fmt::Debug;

use kleene_core::{Assignment, EquationSystemTracer, FixpointSolverTracer};
use tracing::{debug, trace};

/// Logs solver lifecycle and every evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSolverTracer;

impl<U: Debug, V: Debug> FixpointSolverTracer<U, V> for LoggingSolverTracer {
    fn initialized(&self, _rho: &dyn Assignment<U, V>) {
        debug!("fixpoint iteration started");
    }

    fn evaluated(&self, _rho: &dyn Assignment<U, V>, u: &U, value: &V) {
        trace!(unknown = ?u, value = ?value, "evaluated");
    }

    fn completed(&self, _rho: &dyn Assignment<U, V>) {
        debug!("fixpoint reached");
    }
}

/// Logs every right-hand-side evaluation an equation system performs,
/// including whether a box fired and what it produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSystemTracer;

impl<U: Debug, V: Debug> EquationSystemTracer<U, V> for LoggingSystemTracer {
    fn pre_evaluation(&self, _rho: &dyn Assignment<U, V>, u: &U) {
        trace!(unknown = ?u, "evaluating");
    }

    fn post_evaluation(&self, _rho: &dyn Assignment<U, V>, u: &U, computed: &V) {
        trace!(unknown = ?u, computed = ?computed, "evaluated");
    }

    fn box_evaluation(&self, _rho: &dyn Assignment<U, V>, u: &U, computed: &V, boxed: &V) {
        trace!(unknown = ?u, computed = ?computed, boxed = ?boxed, "box applied");
    }

    fn no_box_evaluation(&self, _rho: &dyn Assignment<U, V>, u: &U, computed: &V) {
        trace!(unknown = ?u, computed = ?computed, "no box");
    }
}
