//! Body-backed equation systems

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::algebra::Magma;
use crate::assignment::{
    Assignment, DependencySet, InputAssignment, PartialAssignment, TrackingAssignment,
};
use crate::body::Body;
use crate::boxes::BoxAssignment;
use crate::system::{check_inputs_within, EquationSystem, FiniteEquationSystem, SystemError};
use crate::tracer::{EquationSystemTracer, TracerHandle};

/// An equation system given directly by a [`Body`], without any assumption
/// on the size of the unknown set. The local solver discovers unknowns on
/// demand through the recording-proxy dependency strategy.
pub struct SimpleSystem<U, V> {
    body: Body<U, V>,
    boxes: BoxAssignment<U, V>,
    initial: InputAssignment<U, V>,
    inputs: Rc<dyn Fn(&U) -> bool>,
    tracer: TracerHandle<U, V>,
}

impl<U, V> SimpleSystem<U, V>
where
    U: Clone + 'static,
    V: Clone + 'static,
{
    pub fn new(
        body: Body<U, V>,
        initial: InputAssignment<U, V>,
        inputs: impl Fn(&U) -> bool + 'static,
    ) -> Self {
        Self {
            body,
            boxes: BoxAssignment::empty(),
            initial,
            inputs: Rc::new(inputs),
            tracer: TracerHandle::none(),
        }
    }

    /// Combines `init` into every unknown it is defined at, using `comb`.
    pub fn with_base_assignment(
        mut self,
        init: PartialAssignment<U, V>,
        comb: Rc<dyn Magma<V>>,
    ) -> Self
    where
        U: Eq + Hash,
    {
        self.body = self.body.with_base_assignment(init, comb);
        self
    }

    /// Applies `boxes` after every evaluation. A previously installed box
    /// assignment is folded into the body first, so decorations stack in
    /// call order.
    pub fn with_boxes(mut self, boxes: BoxAssignment<U, V>) -> Self {
        let previous = std::mem::replace(&mut self.boxes, boxes);
        self.body = self.body.with_box_assignment(previous);
        self
    }

    pub fn with_tracer(mut self, tracer: Rc<dyn EquationSystemTracer<U, V>>) -> Self {
        self.tracer.set(tracer);
        self
    }

    pub(crate) fn with_tracer_handle(mut self, tracer: TracerHandle<U, V>) -> Self {
        self.tracer = tracer;
        self
    }
}

impl<U, V> EquationSystem<U, V> for SimpleSystem<U, V>
where
    U: Clone + 'static,
    V: Clone + 'static,
{
    fn apply(&self, rho: &dyn Assignment<U, V>, u: &U) -> V {
        self.tracer.pre(rho, u);
        let computed = self.body.apply(rho, u);
        self.tracer.post(rho, u, &computed);
        match self.boxes.get(u) {
            Some(b) => {
                let boxed = b(&rho.get(u), &computed);
                self.tracer.boxed(rho, u, &computed, &boxed);
                boxed
            }
            None => {
                self.tracer.unboxed(rho, u, &computed);
                computed
            }
        }
    }

    fn apply_with_dependencies(&self, rho: &dyn Assignment<U, V>, u: &U) -> (V, DependencySet<U>) {
        let proxy = TrackingAssignment::new(rho);
        let value = self.apply(&proxy, u);
        (value, proxy.into_log())
    }

    fn initial(&self) -> &InputAssignment<U, V> {
        &self.initial
    }

    fn is_input(&self, u: &U) -> bool {
        (self.inputs)(u)
    }

    fn for_solving(&self) -> Self {
        Self {
            body: self.body.clone(),
            boxes: self.boxes.fresh_copy(),
            initial: self.initial.clone(),
            inputs: self.inputs.clone(),
            tracer: self.tracer.clone(),
        }
    }
}

impl<U, V: Clone> Clone for SimpleSystem<U, V> {
    fn clone(&self) -> Self {
        Self {
            body: self.body.clone(),
            boxes: self.boxes.clone(),
            initial: self.initial.clone(),
            inputs: self.inputs.clone(),
            tracer: self.tracer.clone(),
        }
    }
}

/// A [`SimpleSystem`] over an enumerated unknown set with a static
/// influence relation.
pub struct FiniteSystem<U, V> {
    base: SimpleSystem<U, V>,
    unknowns: Rc<[U]>,
    infl: Rc<dyn Fn(&U) -> Vec<U>>,
    add_diagonal: bool,
}

impl<U, V> FiniteSystem<U, V>
where
    U: Clone + Eq + Hash + fmt::Debug + 'static,
    V: Clone + 'static,
{
    pub fn new(
        body: Body<U, V>,
        initial: InputAssignment<U, V>,
        unknowns: Vec<U>,
        inputs: Vec<U>,
        infl: impl Fn(&U) -> Vec<U> + 'static,
    ) -> Result<Self, SystemError> {
        check_inputs_within(&unknowns, &inputs)?;
        let input_set: Rc<HashSet<U>> = Rc::new(inputs.into_iter().collect());
        Ok(Self {
            base: SimpleSystem::new(body, initial, move |u| input_set.contains(u)),
            unknowns: unknowns.into(),
            infl: Rc::new(infl),
            add_diagonal: false,
        })
    }

    pub(crate) fn from_parts(
        base: SimpleSystem<U, V>,
        unknowns: Rc<[U]>,
        infl: Rc<dyn Fn(&U) -> Vec<U>>,
        add_diagonal: bool,
    ) -> Self {
        Self {
            base,
            unknowns,
            infl,
            add_diagonal,
        }
    }

    pub fn with_base_assignment(
        mut self,
        init: PartialAssignment<U, V>,
        comb: Rc<dyn Magma<V>>,
    ) -> Self {
        self.base = self.base.with_base_assignment(init, comb);
        self
    }

    /// Applies `boxes` after every evaluation. A non-idempotent assignment
    /// extends the influence relation with the diagonal: re-applying such a
    /// box can change the stored value even when no dependency moved.
    pub fn with_boxes(mut self, boxes: BoxAssignment<U, V>) -> Self {
        self.add_diagonal = self.add_diagonal || !boxes.idempotent();
        self.base = self.base.with_boxes(boxes);
        self
    }

    pub fn with_tracer(mut self, tracer: Rc<dyn EquationSystemTracer<U, V>>) -> Self {
        self.base = self.base.with_tracer(tracer);
        self
    }
}

impl<U, V> EquationSystem<U, V> for FiniteSystem<U, V>
where
    U: Clone + Eq + Hash + 'static,
    V: Clone + 'static,
{
    fn apply(&self, rho: &dyn Assignment<U, V>, u: &U) -> V {
        self.base.apply(rho, u)
    }

    fn apply_with_dependencies(&self, rho: &dyn Assignment<U, V>, u: &U) -> (V, DependencySet<U>) {
        self.base.apply_with_dependencies(rho, u)
    }

    fn initial(&self) -> &InputAssignment<U, V> {
        self.base.initial()
    }

    fn is_input(&self, u: &U) -> bool {
        self.base.is_input(u)
    }

    fn for_solving(&self) -> Self {
        Self {
            base: self.base.for_solving(),
            unknowns: self.unknowns.clone(),
            infl: self.infl.clone(),
            add_diagonal: self.add_diagonal,
        }
    }
}

impl<U, V> FiniteEquationSystem<U, V> for FiniteSystem<U, V>
where
    U: Clone + Eq + Hash + 'static,
    V: Clone + 'static,
{
    fn unknowns(&self) -> &[U] {
        &self.unknowns
    }

    fn infl(&self, u: &U) -> Vec<U> {
        let mut dependents = (self.infl)(u);
        if self.add_diagonal && !dependents.contains(u) {
            dependents.push(u.clone());
        }
        dependents
    }
}

impl<U, V: Clone> Clone for FiniteSystem<U, V> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            unknowns: self.unknowns.clone(),
            infl: self.infl.clone(),
            add_diagonal: self.add_diagonal,
        }
    }
}

impl<U: fmt::Debug, V> fmt::Debug for FiniteSystem<U, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FiniteSystem")
            .field("unknowns", &self.unknowns)
            .field("add_diagonal", &self.add_diagonal)
            .finish()
    }
}
