//! Right-hand sides of equation systems
//!
//! A [`Body`] maps an assignment snapshot to the new value of each unknown.
//! Evaluation is per unknown and lazy: nothing is computed until a solver
//! asks for a specific `u`.

use std::rc::Rc;

use crate::algebra::Magma;
use crate::assignment::{Assignment, PartialAssignment};
use crate::boxes::BoxAssignment;

/// The right-hand side `ρ ↦ (u ↦ v)` of an equation system.
pub struct Body<U, V> {
    kind: BodyKind<U, V>,
}

enum BodyKind<U, V> {
    /// Returns the input assignment unchanged. A dedicated variant rather
    /// than a closure, so it carries no allocation and compares equal across
    /// every instantiation.
    Identity,
    Fn(Rc<dyn Fn(&dyn Assignment<U, V>, &U) -> V>),
}

impl<U, V> Body<U, V> {
    pub fn identity() -> Self {
        Self {
            kind: BodyKind::Identity,
        }
    }

    pub fn from_fn(f: impl Fn(&dyn Assignment<U, V>, &U) -> V + 'static) -> Self {
        Self {
            kind: BodyKind::Fn(Rc::new(f)),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, BodyKind::Identity)
    }

    pub fn apply(&self, rho: &dyn Assignment<U, V>, u: &U) -> V {
        match &self.kind {
            BodyKind::Identity => rho.get(u),
            BodyKind::Fn(f) => f(rho, u),
        }
    }
}

impl<U: 'static, V: Clone + 'static> Body<U, V> {
    /// Applies `boxes` on top of this body: wherever a box is defined, the
    /// stored value becomes `β(ρ(u), body(ρ)(u))`.
    ///
    /// Decorating with an empty assignment returns this body unchanged.
    pub fn with_box_assignment(&self, boxes: BoxAssignment<U, V>) -> Self {
        if boxes.is_empty() {
            return self.clone();
        }
        let inner = self.clone();
        Self::from_fn(move |rho, u| {
            let computed = inner.apply(rho, u);
            match boxes.get(u) {
                Some(b) => b(&rho.get(u), &computed),
                None => computed,
            }
        })
    }

    /// Combines a base value into every unknown `init` is defined at:
    /// `comb(init(u), body(ρ)(u))`.
    pub fn with_base_assignment(
        &self,
        init: PartialAssignment<U, V>,
        comb: Rc<dyn Magma<V>>,
    ) -> Self
    where
        U: Eq + std::hash::Hash,
    {
        let inner = self.clone();
        Self::from_fn(move |rho, u| {
            let computed = inner.apply(rho, u);
            match init.get(u) {
                Some(base) => comb.op(&base, &computed),
                None => computed,
            }
        })
    }
}

impl<U, V> Clone for Body<U, V> {
    fn clone(&self) -> Self {
        Self {
            kind: match &self.kind {
                BodyKind::Identity => BodyKind::Identity,
                BodyKind::Fn(f) => BodyKind::Fn(f.clone()),
            },
        }
    }
}

impl<U, V> std::fmt::Debug for Body<U, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            BodyKind::Identity => write!(f, "Body::Identity"),
            BodyKind::Fn(_) => write!(f, "Body::Fn"),
        }
    }
}

/// Identity bodies are all equal; wrapped functions compare by reference.
impl<U, V> PartialEq for Body<U, V> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (BodyKind::Identity, BodyKind::Identity) => true,
            (BodyKind::Fn(a), BodyKind::Fn(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::InputAssignment;
    use crate::boxes::BoxFn;

    #[test]
    fn test_identity_returns_input_unchanged() {
        let body: Body<u32, i64> = Body::identity();
        let rho = InputAssignment::from_fn(|u: &u32| *u as i64 + 10);
        assert_eq!(body.apply(&rho, &5), 15);
        assert_eq!(body.apply(&rho, &0), 10);
    }

    #[test]
    fn test_identity_is_one_value_for_all_instantiations() {
        assert!(Body::<u32, i64>::identity().is_identity());
        assert!(Body::<String, Vec<bool>>::identity().is_identity());
        assert_eq!(Body::<u8, u8>::identity(), Body::<u8, u8>::identity());
    }

    #[test]
    fn test_fn_bodies_compare_by_reference() {
        let a: Body<u32, i64> = Body::from_fn(|rho, u| rho.get(u) + 1);
        let b: Body<u32, i64> = Body::from_fn(|rho, u| rho.get(u) + 1);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(a, Body::identity());
    }

    #[test]
    fn test_base_assignment_combines_where_defined() {
        let body: Body<&str, i64> = Body::from_fn(|rho, u| rho.get(u) + 1);
        let init = PartialAssignment::from_pairs([("x", 100)]);
        let decorated = body.with_base_assignment(init, Rc::new(|a: &i64, b: &i64| a + b));

        let rho = InputAssignment::constant(1);
        // Defined at x: comb(init(x), body(rho)(x)) = 100 + 2.
        assert_eq!(decorated.apply(&rho, &"x"), 102);
        // Undefined elsewhere: plain body.
        assert_eq!(decorated.apply(&rho, &"y"), 2);
    }

    #[test]
    fn test_box_assignment_combines_old_and_new() {
        let body: Body<&str, i64> = Body::from_fn(|rho, u| rho.get(u) + 1);
        let max: BoxFn<i64> = Rc::new(|x: &i64, y: &i64| (*x).max(*y));
        let boxes = BoxAssignment::selective(
            move |u: &&str| if *u == "x" { Some(max.clone()) } else { None },
            true,
        );
        let decorated = body.with_box_assignment(boxes);

        let rho = InputAssignment::from_fn(|u: &&str| if *u == "x" { 9 } else { 0 });
        // Box at x: max(rho(x), rho(x) + 1) = 10.
        assert_eq!(decorated.apply(&rho, &"x"), 10);
        // No box at y.
        assert_eq!(decorated.apply(&rho, &"y"), 1);
    }

    #[test]
    fn test_empty_box_assignment_is_identity_decoration() {
        let body: Body<u32, i64> = Body::from_fn(|rho, u| rho.get(u) * 2);
        let decorated = body.with_box_assignment(BoxAssignment::empty());
        assert_eq!(body, decorated);

        let id: Body<u32, i64> = Body::identity();
        assert_eq!(id.with_box_assignment(BoxAssignment::empty()), id);
    }
}
