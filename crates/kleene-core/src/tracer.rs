//! Observability hooks for systems and solvers
//!
//! Two listener traits with empty default methods: [`EquationSystemTracer`]
//! fires around each right-hand-side evaluation, [`FixpointSolverTracer`]
//! around a whole solver run. [`NullTracer`] implements both and
//! monomorphizes to nothing when a solver is instantiated with it.
//!
//! System-side call sites are additionally gated behind the `trace` cargo
//! feature; building without it strips them entirely.

use std::cell::Cell;
use std::rc::Rc;

use crate::assignment::Assignment;

/// Hooks fired by an equation system around one evaluation of `u`.
///
/// The order per evaluation is `pre_evaluation`, `post_evaluation`, then
/// exactly one of `box_evaluation` / `no_box_evaluation`.
pub trait EquationSystemTracer<U, V> {
    fn pre_evaluation(&self, rho: &dyn Assignment<U, V>, u: &U) {
        let _ = (rho, u);
    }

    fn post_evaluation(&self, rho: &dyn Assignment<U, V>, u: &U, computed: &V) {
        let _ = (rho, u, computed);
    }

    fn box_evaluation(&self, rho: &dyn Assignment<U, V>, u: &U, computed: &V, boxed: &V) {
        let _ = (rho, u, computed, boxed);
    }

    fn no_box_evaluation(&self, rho: &dyn Assignment<U, V>, u: &U, computed: &V) {
        let _ = (rho, u, computed);
    }
}

/// Hooks fired by a solver: once at start, once per dequeued unknown, once
/// at completion.
pub trait FixpointSolverTracer<U, V> {
    fn initialized(&self, rho: &dyn Assignment<U, V>) {
        let _ = rho;
    }

    fn evaluated(&self, rho: &dyn Assignment<U, V>, u: &U, value: &V) {
        let _ = (rho, u, value);
    }

    fn completed(&self, rho: &dyn Assignment<U, V>) {
        let _ = rho;
    }
}

/// Listens to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTracer;

impl<U, V> EquationSystemTracer<U, V> for NullTracer {}
impl<U, V> FixpointSolverTracer<U, V> for NullTracer {}

/// Counts solver events; the cheap way to measure how much work a solve did.
#[derive(Debug, Default)]
pub struct CountingTracer {
    evaluations: Cell<usize>,
    changes: Cell<usize>,
}

impl CountingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Right-hand-side evaluations performed.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Evaluations whose result differed from the stored value.
    pub fn changes(&self) -> usize {
        self.changes.get()
    }
}

impl<U, V: PartialEq> FixpointSolverTracer<U, V> for CountingTracer {
    fn evaluated(&self, rho: &dyn Assignment<U, V>, u: &U, value: &V) {
        self.evaluations.set(self.evaluations.get() + 1);
        if rho.get(u) != *value {
            self.changes.set(self.changes.get() + 1);
        }
    }
}

/// The tracer slot equation systems carry. Event forwarding compiles away
/// without the `trace` feature.
pub(crate) struct TracerHandle<U, V> {
    inner: Option<Rc<dyn EquationSystemTracer<U, V>>>,
}

impl<U, V> TracerHandle<U, V> {
    pub(crate) fn none() -> Self {
        Self { inner: None }
    }

    pub(crate) fn set(&mut self, tracer: Rc<dyn EquationSystemTracer<U, V>>) {
        self.inner = Some(tracer);
    }
}

#[cfg(feature = "trace")]
impl<U, V> TracerHandle<U, V> {
    #[inline]
    pub(crate) fn pre(&self, rho: &dyn Assignment<U, V>, u: &U) {
        if let Some(t) = &self.inner {
            t.pre_evaluation(rho, u);
        }
    }

    #[inline]
    pub(crate) fn post(&self, rho: &dyn Assignment<U, V>, u: &U, computed: &V) {
        if let Some(t) = &self.inner {
            t.post_evaluation(rho, u, computed);
        }
    }

    #[inline]
    pub(crate) fn boxed(&self, rho: &dyn Assignment<U, V>, u: &U, computed: &V, boxed: &V) {
        if let Some(t) = &self.inner {
            t.box_evaluation(rho, u, computed, boxed);
        }
    }

    #[inline]
    pub(crate) fn unboxed(&self, rho: &dyn Assignment<U, V>, u: &U, computed: &V) {
        if let Some(t) = &self.inner {
            t.no_box_evaluation(rho, u, computed);
        }
    }
}

#[cfg(not(feature = "trace"))]
impl<U, V> TracerHandle<U, V> {
    #[inline(always)]
    pub(crate) fn pre(&self, _rho: &dyn Assignment<U, V>, _u: &U) {}

    #[inline(always)]
    pub(crate) fn post(&self, _rho: &dyn Assignment<U, V>, _u: &U, _computed: &V) {}

    #[inline(always)]
    pub(crate) fn boxed(&self, _rho: &dyn Assignment<U, V>, _u: &U, _computed: &V, _boxed: &V) {}

    #[inline(always)]
    pub(crate) fn unboxed(&self, _rho: &dyn Assignment<U, V>, _u: &U, _computed: &V) {}
}

impl<U, V> Clone for TracerHandle<U, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
