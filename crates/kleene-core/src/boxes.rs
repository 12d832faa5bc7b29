//! Boxes: binary operators combining an old value with a new one
//!
//! A box `β(old, new)` decides what to store after a right-hand side has
//! been evaluated; widenings and narrowings are the usual instances. A
//! [`BoxAssignment`] picks a box per unknown and carries a global
//! idempotence flag: a box is idempotent when `β(x, β(x, y)) = β(x, y)`,
//! and solvers exploit the flag to avoid self-influence edges.
//!
//! A box assignment may close over mutable state (e.g. application
//! counters). Every solver takes a fresh copy via
//! [`BoxAssignment::fresh_copy`] before its first evaluation and uses that
//! copy exclusively; sharing an uncopied stateful assignment across solves
//! leaves the counters mid-flight and the results are unspecified.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::algebra::Domain;

/// A box operator: old value and freshly computed value in, stored value out.
pub type BoxFn<V> = Rc<dyn Fn(&V, &V) -> V>;

/// A per-unknown selection of boxes whose internal state must survive
/// between evaluations of the same solve but not across solves.
pub trait StatefulBoxes<U, V> {
    /// The box to apply at `u` right now. May advance internal state; the
    /// caller invokes this exactly once per box application.
    fn select(&self, u: &U) -> Option<BoxFn<V>>;

    /// Membership query. Must not advance any internal state: structure
    /// rewrites ask this many times per evaluation.
    fn defined_at(&self, u: &U) -> bool;

    fn idempotent(&self) -> bool {
        false
    }

    /// A copy with pristine internal state.
    fn fresh(&self) -> Rc<dyn StatefulBoxes<U, V>>;
}

/// Per-unknown boxes, empty, pure, or stateful.
pub struct BoxAssignment<U, V> {
    kind: BoxesKind<U, V>,
}

enum BoxesKind<U, V> {
    Empty,
    Pure {
        select: Rc<dyn Fn(&U) -> Option<BoxFn<V>>>,
        idempotent: bool,
    },
    Stateful(Rc<dyn StatefulBoxes<U, V>>),
}

impl<U, V: 'static> BoxAssignment<U, V> {
    /// No box anywhere; decorating with this is the identity.
    pub fn empty() -> Self {
        Self {
            kind: BoxesKind::Empty,
        }
    }

    /// The same box on every unknown.
    pub fn uniform(r#box: impl Fn(&V, &V) -> V + 'static, idempotent: bool) -> Self {
        let shared: BoxFn<V> = Rc::new(r#box);
        Self {
            kind: BoxesKind::Pure {
                select: Rc::new(move |_| Some(shared.clone())),
                idempotent,
            },
        }
    }

    /// A box on the unknowns `select` accepts, nothing elsewhere.
    pub fn selective(select: impl Fn(&U) -> Option<BoxFn<V>> + 'static, idempotent: bool) -> Self {
        Self {
            kind: BoxesKind::Pure {
                select: Rc::new(select),
                idempotent,
            },
        }
    }

    pub fn stateful(boxes: Rc<dyn StatefulBoxes<U, V>>) -> Self {
        Self {
            kind: BoxesKind::Stateful(boxes),
        }
    }

    pub fn get(&self, u: &U) -> Option<BoxFn<V>> {
        match &self.kind {
            BoxesKind::Empty => None,
            BoxesKind::Pure { select, .. } => select(u),
            BoxesKind::Stateful(s) => s.select(u),
        }
    }

    /// Membership without advancing stateful counters.
    pub fn is_defined_at(&self, u: &U) -> bool {
        match &self.kind {
            BoxesKind::Empty => false,
            BoxesKind::Pure { select, .. } => select(u).is_some(),
            BoxesKind::Stateful(s) => s.defined_at(u),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, BoxesKind::Empty)
    }

    /// True only when every box this assignment yields is idempotent.
    pub fn idempotent(&self) -> bool {
        match &self.kind {
            BoxesKind::Empty => true,
            BoxesKind::Pure { idempotent, .. } => *idempotent,
            BoxesKind::Stateful(s) => s.idempotent(),
        }
    }

    /// The defensive copy solvers take before their first evaluation.
    ///
    /// Pure assignments share; stateful assignments restart their counters.
    pub fn fresh_copy(&self) -> Self {
        match &self.kind {
            BoxesKind::Stateful(s) => Self {
                kind: BoxesKind::Stateful(s.fresh()),
            },
            _ => self.clone(),
        }
    }
}

impl<U, V> Clone for BoxAssignment<U, V> {
    fn clone(&self) -> Self {
        Self {
            kind: match &self.kind {
                BoxesKind::Empty => BoxesKind::Empty,
                BoxesKind::Pure { select, idempotent } => BoxesKind::Pure {
                    select: select.clone(),
                    idempotent: *idempotent,
                },
                BoxesKind::Stateful(s) => BoxesKind::Stateful(s.clone()),
            },
        }
    }
}

/// Builds the box that widens while the new value escapes the old one and
/// narrows once it no longer does.
pub fn warrowing<V: 'static>(
    widen: BoxFn<V>,
    narrow: BoxFn<V>,
    dom: Rc<dyn Domain<V>>,
) -> BoxFn<V> {
    Rc::new(move |old, new| {
        if dom.lteq(new, old) {
            narrow(old, new)
        } else {
            widen(old, new)
        }
    })
}

/// A stateful box source: each unknown widens for its first `switch_after`
/// applications, then narrows.
pub struct CadencedBoxes<U, V> {
    widen: BoxFn<V>,
    narrow: BoxFn<V>,
    switch_after: usize,
    counts: RefCell<HashMap<U, usize>>,
}

impl<U: Eq + Hash + Clone, V> CadencedBoxes<U, V> {
    pub fn new(widen: BoxFn<V>, narrow: BoxFn<V>, switch_after: usize) -> Rc<Self> {
        Rc::new(Self {
            widen,
            narrow,
            switch_after,
            counts: RefCell::new(HashMap::new()),
        })
    }
}

impl<U: Eq + Hash + Clone + 'static, V: 'static> StatefulBoxes<U, V> for CadencedBoxes<U, V> {
    fn select(&self, u: &U) -> Option<BoxFn<V>> {
        let mut counts = self.counts.borrow_mut();
        let n = counts.entry(u.clone()).or_insert(0);
        *n += 1;
        if *n <= self.switch_after {
            Some(self.widen.clone())
        } else {
            Some(self.narrow.clone())
        }
    }

    fn defined_at(&self, _u: &U) -> bool {
        true
    }

    fn fresh(&self) -> Rc<dyn StatefulBoxes<U, V>> {
        Rc::new(Self {
            widen: self.widen.clone(),
            narrow: self.narrow.clone(),
            switch_after: self.switch_after,
            counts: RefCell::new(HashMap::new()),
        })
    }
}
