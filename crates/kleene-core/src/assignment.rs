//! Assignments from unknowns to values
//!
//! Three flavors, matching how solvers consume them:
//! - [`InputAssignment`]: an immutable total map, usually the start value of
//!   an iteration.
//! - [`PartialAssignment`]: defined on a subset of unknowns, with a
//!   membership query; used for base assignments and per-unknown boxes.
//! - [`MutableAssignment`]: the working state of a solver, explicit bindings
//!   over a shared fallback.
//!
//! [`TrackingAssignment`] wraps any assignment and records which unknowns a
//! right-hand side actually read.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use smallvec::SmallVec;

/// Unknowns consulted while evaluating one right-hand side.
pub type DependencySet<U> = SmallVec<[U; 8]>;

/// A total, read-only view of unknowns to values.
pub trait Assignment<U, V> {
    fn get(&self, u: &U) -> V;
}

/// An immutable total assignment, producing a value for every unknown.
pub struct InputAssignment<U, V> {
    kind: InputKind<U, V>,
}

enum InputKind<U, V> {
    Constant(V),
    Fn(Rc<dyn Fn(&U) -> V>),
}

impl<U, V: Clone> InputAssignment<U, V> {
    /// The assignment mapping every unknown to `value`.
    pub fn constant(value: V) -> Self {
        Self {
            kind: InputKind::Constant(value),
        }
    }
}

impl<U, V> InputAssignment<U, V> {
    pub fn from_fn(f: impl Fn(&U) -> V + 'static) -> Self {
        Self {
            kind: InputKind::Fn(Rc::new(f)),
        }
    }
}

impl<U, V: Clone> Clone for InputAssignment<U, V> {
    fn clone(&self) -> Self {
        Self {
            kind: match &self.kind {
                InputKind::Constant(v) => InputKind::Constant(v.clone()),
                InputKind::Fn(f) => InputKind::Fn(f.clone()),
            },
        }
    }
}

impl<U, V: Clone> Assignment<U, V> for InputAssignment<U, V> {
    fn get(&self, u: &U) -> V {
        match &self.kind {
            InputKind::Constant(v) => v.clone(),
            InputKind::Fn(f) => f(u),
        }
    }
}

/// An assignment defined on a subset of unknowns.
pub struct PartialAssignment<U, V> {
    kind: PartialKind<U, V>,
}

enum PartialKind<U, V> {
    Map(Rc<HashMap<U, V>>),
    Fn(Rc<dyn Fn(&U) -> Option<V>>),
}

impl<U: Eq + Hash, V> PartialAssignment<U, V> {
    pub fn empty() -> Self {
        Self {
            kind: PartialKind::Map(Rc::new(HashMap::new())),
        }
    }

    pub fn from_map(map: HashMap<U, V>) -> Self {
        Self {
            kind: PartialKind::Map(Rc::new(map)),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (U, V)>) -> Self {
        Self::from_map(pairs.into_iter().collect())
    }
}

impl<U, V> PartialAssignment<U, V> {
    pub fn from_fn(f: impl Fn(&U) -> Option<V> + 'static) -> Self {
        Self {
            kind: PartialKind::Fn(Rc::new(f)),
        }
    }
}

impl<U: Eq + Hash, V: Clone> PartialAssignment<U, V> {
    pub fn get(&self, u: &U) -> Option<V> {
        match &self.kind {
            PartialKind::Map(m) => m.get(u).cloned(),
            PartialKind::Fn(f) => f(u),
        }
    }

    pub fn is_defined_at(&self, u: &U) -> bool {
        match &self.kind {
            PartialKind::Map(m) => m.contains_key(u),
            PartialKind::Fn(f) => f(u).is_some(),
        }
    }
}

impl<U, V> Clone for PartialAssignment<U, V> {
    fn clone(&self) -> Self {
        Self {
            kind: match &self.kind {
                PartialKind::Map(m) => PartialKind::Map(m.clone()),
                PartialKind::Fn(f) => PartialKind::Fn(f.clone()),
            },
        }
    }
}

/// The mutable working assignment of a solver.
///
/// Explicit bindings shadow a fallback [`InputAssignment`]. Reading an
/// unbound unknown yields the fallback's value and records nothing; only
/// [`set`](Self::set) creates a binding.
pub struct MutableAssignment<U, V> {
    bindings: HashMap<U, V>,
    fallback: InputAssignment<U, V>,
}

impl<U: Eq + Hash, V: Clone> MutableAssignment<U, V> {
    pub fn new(fallback: InputAssignment<U, V>) -> Self {
        Self {
            bindings: HashMap::new(),
            fallback,
        }
    }

    pub fn set(&mut self, u: U, v: V) {
        self.bindings.insert(u, v);
    }

    /// True when an explicit binding has been recorded for `u`.
    pub fn is_defined_at(&self, u: &U) -> bool {
        self.bindings.contains_key(u)
    }

    pub fn fallback(&self) -> &InputAssignment<U, V> {
        &self.fallback
    }

    /// The explicit bindings, in no particular order.
    pub fn bindings(&self) -> impl Iterator<Item = (&U, &V)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<U, V> MutableAssignment<U, V>
where
    U: Clone + Eq + Hash + 'static,
    V: Clone + 'static,
{
    /// An immutable total view of the current state. Later writes to this
    /// assignment are not reflected in the snapshot.
    pub fn snapshot(&self) -> InputAssignment<U, V> {
        let bindings = self.bindings.clone();
        let fallback = self.fallback.clone();
        InputAssignment::from_fn(move |u| match bindings.get(u) {
            Some(v) => v.clone(),
            None => fallback.get(u),
        })
    }
}

impl<U: Eq + Hash, V: Clone> Assignment<U, V> for MutableAssignment<U, V> {
    fn get(&self, u: &U) -> V {
        match self.bindings.get(u) {
            Some(v) => v.clone(),
            None => self.fallback.get(u),
        }
    }
}

/// A recording proxy: forwards reads and logs every queried unknown.
///
/// The generic dependency-tracking strategy evaluates a right-hand side once
/// through this proxy and hands back the log. Duplicates are preserved.
pub struct TrackingAssignment<'a, U, V> {
    inner: &'a dyn Assignment<U, V>,
    log: RefCell<DependencySet<U>>,
}

impl<'a, U, V> TrackingAssignment<'a, U, V> {
    pub fn new(inner: &'a dyn Assignment<U, V>) -> Self {
        Self {
            inner,
            log: RefCell::new(SmallVec::new()),
        }
    }

    /// The unknowns read so far, in query order.
    pub fn into_log(self) -> DependencySet<U> {
        self.log.into_inner()
    }
}

impl<U: Clone, V> Assignment<U, V> for TrackingAssignment<'_, U, V> {
    fn get(&self, u: &U) -> V {
        self.log.borrow_mut().push(u.clone());
        self.inner.get(u)
    }
}
