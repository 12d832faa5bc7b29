//! Hyper-graph equation systems
//!
//! Right-hand sides presented as a directed hyper-graph: each edge reads a
//! set of source unknowns and contributes a value to its target; the body
//! of an unknown is the upper bound of its ingoing contributions. The graph
//! presentation is what makes *localized* widening possible: a box can be
//! confined to the back edges of its target instead of firing on every
//! evaluation.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::algebra::{Domain, Magma, UnknownOrder};
use crate::assignment::{Assignment, DependencySet, InputAssignment, PartialAssignment};
use crate::body::Body;
use crate::boxes::BoxAssignment;
use crate::system::{check_inputs_within, EquationSystem, FiniteEquationSystem, SystemError};
use crate::system::{FiniteSystem, SimpleSystem};
use crate::tracer::{EquationSystemTracer, TracerHandle};

/// The hyper-graph behind a [`GraphSystem`]: per-edge contributions plus the
/// incidence structure connecting them.
pub trait EquationGraph<U, V, E> {
    /// The contribution edge `e` feeds into its target under `rho`.
    fn edge_action(&self, rho: &dyn Assignment<U, V>, e: &E) -> V;

    fn sources(&self, e: &E) -> Vec<U>;

    fn target(&self, e: &E) -> U;

    fn outgoing(&self, u: &U) -> Vec<E>;

    fn ingoing(&self, u: &U) -> Vec<E>;

    /// Per-solve copy; graphs carrying stateful boxes restart them.
    fn fresh(&self) -> Self
    where
        Self: Sized;
}

/// An [`EquationGraph`] assembled from closures.
pub struct FnGraph<U, V, E> {
    edge_action: Rc<dyn Fn(&dyn Assignment<U, V>, &E) -> V>,
    sources: Rc<dyn Fn(&E) -> Vec<U>>,
    target: Rc<dyn Fn(&E) -> U>,
    outgoing: Rc<dyn Fn(&U) -> Vec<E>>,
    ingoing: Rc<dyn Fn(&U) -> Vec<E>>,
}

impl<U, V, E> FnGraph<U, V, E> {
    pub fn new(
        edge_action: impl Fn(&dyn Assignment<U, V>, &E) -> V + 'static,
        sources: impl Fn(&E) -> Vec<U> + 'static,
        target: impl Fn(&E) -> U + 'static,
        outgoing: impl Fn(&U) -> Vec<E> + 'static,
        ingoing: impl Fn(&U) -> Vec<E> + 'static,
    ) -> Self {
        Self {
            edge_action: Rc::new(edge_action),
            sources: Rc::new(sources),
            target: Rc::new(target),
            outgoing: Rc::new(outgoing),
            ingoing: Rc::new(ingoing),
        }
    }
}

impl<U, V, E> EquationGraph<U, V, E> for FnGraph<U, V, E> {
    fn edge_action(&self, rho: &dyn Assignment<U, V>, e: &E) -> V {
        (self.edge_action)(rho, e)
    }

    fn sources(&self, e: &E) -> Vec<U> {
        (self.sources)(e)
    }

    fn target(&self, e: &E) -> U {
        (self.target)(e)
    }

    fn outgoing(&self, u: &U) -> Vec<E> {
        (self.outgoing)(u)
    }

    fn ingoing(&self, u: &U) -> Vec<E> {
        (self.ingoing)(u)
    }

    fn fresh(&self) -> Self {
        self.clone()
    }
}

impl<U, V, E> Clone for FnGraph<U, V, E> {
    fn clone(&self) -> Self {
        Self {
            edge_action: self.edge_action.clone(),
            sources: self.sources.clone(),
            target: self.target.clone(),
            outgoing: self.outgoing.clone(),
            ingoing: self.ingoing.clone(),
        }
    }
}

/// Dense handle for an edge registered through a [`GraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

/// An [`EquationGraph`] over [`EdgeId`] handles with precomputed incidence
/// maps.
pub struct EdgeListGraph<U, V> {
    actions: Vec<Rc<dyn Fn(&dyn Assignment<U, V>) -> V>>,
    sources: Vec<Vec<U>>,
    targets: Vec<U>,
    outgoing: Rc<HashMap<U, Vec<EdgeId>>>,
    ingoing: Rc<HashMap<U, Vec<EdgeId>>>,
}

impl<U, V> EquationGraph<U, V, EdgeId> for EdgeListGraph<U, V>
where
    U: Clone + Eq + Hash,
{
    fn edge_action(&self, rho: &dyn Assignment<U, V>, e: &EdgeId) -> V {
        (self.actions[e.0])(rho)
    }

    fn sources(&self, e: &EdgeId) -> Vec<U> {
        self.sources[e.0].clone()
    }

    fn target(&self, e: &EdgeId) -> U {
        self.targets[e.0].clone()
    }

    fn outgoing(&self, u: &U) -> Vec<EdgeId> {
        self.outgoing.get(u).cloned().unwrap_or_default()
    }

    fn ingoing(&self, u: &U) -> Vec<EdgeId> {
        self.ingoing.get(u).cloned().unwrap_or_default()
    }

    fn fresh(&self) -> Self {
        self.clone()
    }
}

impl<U: Clone, V> Clone for EdgeListGraph<U, V> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            sources: self.sources.clone(),
            targets: self.targets.clone(),
            outgoing: self.outgoing.clone(),
            ingoing: self.ingoing.clone(),
        }
    }
}

/// Collects `(sources, target, action)` triples and produces an
/// [`EdgeListGraph`].
pub struct GraphBuilder<U, V> {
    actions: Vec<Rc<dyn Fn(&dyn Assignment<U, V>) -> V>>,
    sources: Vec<Vec<U>>,
    targets: Vec<U>,
}

impl<U, V> GraphBuilder<U, V>
where
    U: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            sources: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn edge(
        mut self,
        sources: Vec<U>,
        target: U,
        action: impl Fn(&dyn Assignment<U, V>) -> V + 'static,
    ) -> Self {
        self.actions.push(Rc::new(action));
        self.sources.push(sources);
        self.targets.push(target);
        self
    }

    pub fn build(self) -> EdgeListGraph<U, V> {
        let mut outgoing: HashMap<U, Vec<EdgeId>> = HashMap::new();
        let mut ingoing: HashMap<U, Vec<EdgeId>> = HashMap::new();
        for (i, target) in self.targets.iter().enumerate() {
            ingoing.entry(target.clone()).or_default().push(EdgeId(i));
        }
        for (i, sources) in self.sources.iter().enumerate() {
            for s in sources {
                let entry = outgoing.entry(s.clone()).or_default();
                if !entry.contains(&EdgeId(i)) {
                    entry.push(EdgeId(i));
                }
            }
        }
        EdgeListGraph {
            actions: self.actions,
            sources: self.sources,
            targets: self.targets,
            outgoing: Rc::new(outgoing),
            ingoing: Rc::new(ingoing),
        }
    }
}

impl<U: Clone + Eq + Hash, V> Default for GraphBuilder<U, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A graph whose edge actions apply a box on the back edges of the box's
/// target: edge `e` into `x` is rewritten to `β(x)(ρ(x), action(e))` when
/// some source `s` of `e` satisfies `x ≤ s` under the given order.
///
/// With a non-idempotent box assignment the structure is rewritten too, so
/// a change to `ρ(x)` re-fires the box: `x` joins the sources of every edge
/// the box applies on, and the ingoing edges of `x` that have a source above
/// `x` join its outgoing set.
pub struct LocalizedGraph<U, V, E, G> {
    base: G,
    boxes: BoxAssignment<U, V>,
    ord: Rc<dyn UnknownOrder<U>>,
    _edge: PhantomData<E>,
}

impl<U, V, E, G> LocalizedGraph<U, V, E, G>
where
    U: Clone + Eq,
    V: 'static,
    G: EquationGraph<U, V, E>,
{
    fn applies_on(&self, e: &E) -> bool {
        let x = self.base.target(e);
        self.boxes.is_defined_at(&x) && self.back_edge(e, &x)
    }

    fn back_edge(&self, e: &E, x: &U) -> bool {
        self.base.sources(e).iter().any(|s| self.ord.le(x, s))
    }
}

impl<U, V, E, G> EquationGraph<U, V, E> for LocalizedGraph<U, V, E, G>
where
    U: Clone + Eq,
    V: Clone + 'static,
    G: EquationGraph<U, V, E>,
{
    fn edge_action(&self, rho: &dyn Assignment<U, V>, e: &E) -> V {
        let x = self.base.target(e);
        let computed = self.base.edge_action(rho, e);
        if self.back_edge(e, &x) {
            match self.boxes.get(&x) {
                Some(b) => b(&rho.get(&x), &computed),
                None => computed,
            }
        } else {
            computed
        }
    }

    fn sources(&self, e: &E) -> Vec<U> {
        let mut sources = self.base.sources(e);
        if !self.boxes.idempotent() && self.applies_on(e) {
            let x = self.base.target(e);
            if !sources.contains(&x) {
                sources.push(x);
            }
        }
        sources
    }

    fn target(&self, e: &E) -> U {
        self.base.target(e)
    }

    fn outgoing(&self, u: &U) -> Vec<E> {
        let mut edges = self.base.outgoing(u);
        if !self.boxes.idempotent() && self.boxes.is_defined_at(u) {
            edges.extend(
                self.base
                    .ingoing(u)
                    .into_iter()
                    .filter(|e| self.base.sources(e).iter().any(|s| self.ord.ge(s, u))),
            );
        }
        edges
    }

    fn ingoing(&self, u: &U) -> Vec<E> {
        self.base.ingoing(u)
    }

    fn fresh(&self) -> Self {
        Self {
            base: self.base.fresh(),
            boxes: self.boxes.fresh_copy(),
            ord: self.ord.clone(),
            _edge: PhantomData,
        }
    }
}

/// An equation system derived from an [`EquationGraph`]: the body of `x` is
/// the upper bound of its ingoing contributions, and an unknown with no
/// defining edges is stationary (`body(ρ)(x) = ρ(x)`).
pub struct GraphSystem<U, V, E, G> {
    graph: G,
    dom: Rc<dyn Domain<V>>,
    unknowns: Rc<[U]>,
    inputs: Rc<HashSet<U>>,
    initial: InputAssignment<U, V>,
    base: Option<(PartialAssignment<U, V>, Rc<dyn Magma<V>>)>,
    tracer: TracerHandle<U, V>,
    _edge: PhantomData<E>,
}

fn derived_value<U, V, E, G>(
    graph: &G,
    dom: &dyn Domain<V>,
    base: Option<&(PartialAssignment<U, V>, Rc<dyn Magma<V>>)>,
    rho: &dyn Assignment<U, V>,
    u: &U,
) -> V
where
    U: Clone + Eq + Hash,
    V: Clone,
    G: EquationGraph<U, V, E>,
{
    let mut acc: Option<V> = None;
    for e in graph.ingoing(u) {
        let contribution = graph.edge_action(rho, &e);
        acc = Some(match acc {
            None => contribution,
            Some(v) => dom.upper_bound(&v, &contribution),
        });
    }
    let mut value = match acc {
        Some(v) => v,
        None => rho.get(u),
    };
    if let Some((init, comb)) = base {
        if let Some(b) = init.get(u) {
            value = comb.op(&b, &value);
        }
    }
    value
}

impl<U, V, E, G> GraphSystem<U, V, E, G>
where
    U: Clone + Eq + Hash + fmt::Debug + 'static,
    V: Clone + 'static,
    E: 'static,
    G: EquationGraph<U, V, E> + 'static,
{
    pub fn new(
        graph: G,
        dom: Rc<dyn Domain<V>>,
        unknowns: Vec<U>,
        inputs: Vec<U>,
        initial: InputAssignment<U, V>,
    ) -> Result<Self, SystemError> {
        check_inputs_within(&unknowns, &inputs)?;
        Ok(Self {
            graph,
            dom,
            unknowns: unknowns.into(),
            inputs: Rc::new(inputs.into_iter().collect()),
            initial,
            base: None,
            tracer: TracerHandle::none(),
            _edge: PhantomData,
        })
    }

    /// Combines `init` into every unknown it is defined at. The dependency
    /// structure is unchanged: the base value reads no unknowns.
    pub fn with_base_assignment(
        mut self,
        init: PartialAssignment<U, V>,
        comb: Rc<dyn Magma<V>>,
    ) -> Self {
        self.base = Some((init, comb));
        self
    }

    pub fn with_tracer(mut self, tracer: Rc<dyn EquationSystemTracer<U, V>>) -> Self {
        self.tracer.set(tracer);
        self
    }

    /// Applies `boxes` to the whole body of each unknown it is defined at.
    /// The graph presentation is lost; use
    /// [`with_localized_boxes`](Self::with_localized_boxes) to keep it.
    pub fn with_boxes(self, boxes: BoxAssignment<U, V>) -> FiniteSystem<U, V> {
        self.into_finite().with_boxes(boxes)
    }

    /// Confines each box to the back edges of its target: edge `e` into `x`
    /// is boxed when some source of `e` is at or above `x` in `ord`. With a
    /// non-idempotent assignment the incidence structure is extended so the
    /// box re-fires when `ρ(x)` itself changes.
    pub fn with_localized_boxes(
        self,
        boxes: BoxAssignment<U, V>,
        ord: Rc<dyn UnknownOrder<U>>,
    ) -> GraphSystem<U, V, E, LocalizedGraph<U, V, E, G>> {
        GraphSystem {
            graph: LocalizedGraph {
                base: self.graph,
                boxes,
                ord,
                _edge: PhantomData,
            },
            dom: self.dom,
            unknowns: self.unknowns,
            inputs: self.inputs,
            initial: self.initial,
            base: self.base,
            tracer: self.tracer,
            _edge: PhantomData,
        }
    }

    /// Per-unknown widening/narrowing driven by edge-level comparisons:
    /// each ingoing contribution is paired with a flag marking a back-edge
    /// contribution that escapes the current value; the pairs are reduced
    /// with `(v₁ ⊔ v₂, f₁ ∨ f₂)`, and the reduced flag chooses widening,
    /// narrowing, or the plain result.
    ///
    /// Experimental. The rewrite depends on comparisons against `ρ(x)` that
    /// cannot be pushed back into per-edge actions, so the result is a flat
    /// [`FiniteSystem`], no longer a graph. Stateful `widenings`/`narrowings`
    /// are baked into the flat body; fresh-copy them per solve yourself.
    pub fn with_localized_warrowing(
        self,
        widenings: BoxAssignment<U, V>,
        narrowings: BoxAssignment<U, V>,
        ord: Rc<dyn UnknownOrder<U>>,
    ) -> FiniteSystem<U, V> {
        let add_diagonal = !(widenings.idempotent() && narrowings.idempotent());
        let graph = Rc::new(self.graph);
        let dom = self.dom.clone();
        let base = self.base.clone();
        let body_graph = graph.clone();
        let body = Body::from_fn(move |rho: &dyn Assignment<U, V>, x: &U| {
            let edges = body_graph.ingoing(x);
            let Some(first) = edges.first() else {
                return rho.get(x);
            };
            let current = rho.get(x);
            let contribution = |e: &E| {
                let c = body_graph.edge_action(rho, e);
                let widen_here = body_graph.sources(e).iter().any(|s| ord.le(x, s))
                    && !dom.lteq(&c, &current);
                (c, widen_here)
            };
            let (mut result, mut any_widen) = contribution(first);
            for e in &edges[1..] {
                let (c, w) = contribution(e);
                result = dom.upper_bound(&result, &c);
                any_widen = any_widen || w;
            }
            if let Some((init, comb)) = &base {
                if let Some(b) = init.get(x) {
                    result = comb.op(&b, &result);
                }
            }
            if any_widen {
                match widenings.get(x) {
                    Some(w) => w(&current, &result),
                    None => result,
                }
            } else if dom.lt(&result, &current) {
                match narrowings.get(x) {
                    Some(n) => n(&current, &result),
                    None => result,
                }
            } else {
                result
            }
        });
        let infl_graph = graph;
        let infl = move |u: &U| {
            infl_graph
                .outgoing(u)
                .iter()
                .map(|e| infl_graph.target(e))
                .collect::<Vec<U>>()
        };
        let inputs = self.inputs.clone();
        FiniteSystem::from_parts(
            SimpleSystem::new(body, self.initial, move |u| inputs.contains(u))
                .with_tracer_handle(self.tracer),
            self.unknowns,
            Rc::new(infl),
            add_diagonal,
        )
    }

    /// Flattens the derived body into a [`FiniteSystem`], dropping the
    /// graph presentation.
    pub fn into_finite(self) -> FiniteSystem<U, V> {
        let graph = Rc::new(self.graph);
        let dom = self.dom.clone();
        let base = self.base.clone();
        let body_graph = graph.clone();
        let body = Body::from_fn(move |rho: &dyn Assignment<U, V>, u: &U| {
            derived_value(body_graph.as_ref(), dom.as_ref(), base.as_ref(), rho, u)
        });
        let infl = move |u: &U| {
            graph
                .outgoing(u)
                .iter()
                .map(|e| graph.target(e))
                .collect::<Vec<U>>()
        };
        let inputs = self.inputs.clone();
        FiniteSystem::from_parts(
            SimpleSystem::new(body, self.initial, move |u| inputs.contains(u))
                .with_tracer_handle(self.tracer),
            self.unknowns,
            Rc::new(infl),
            false,
        )
    }
}

impl<U, V, E, G> EquationSystem<U, V> for GraphSystem<U, V, E, G>
where
    U: Clone + Eq + Hash + 'static,
    V: Clone + 'static,
    G: EquationGraph<U, V, E>,
{
    fn apply(&self, rho: &dyn Assignment<U, V>, u: &U) -> V {
        self.tracer.pre(rho, u);
        let value = derived_value(&self.graph, self.dom.as_ref(), self.base.as_ref(), rho, u);
        self.tracer.post(rho, u, &value);
        self.tracer.unboxed(rho, u, &value);
        value
    }

    /// Dependencies come from the static incidence structure: the union of
    /// the sources of all ingoing edges. In debug builds the result is
    /// cross-checked against a recording proxy (which evaluates the body a
    /// second time): an edge action reading an unknown outside its declared
    /// sources is a contract violation and panics.
    fn apply_with_dependencies(&self, rho: &dyn Assignment<U, V>, u: &U) -> (V, DependencySet<U>) {
        let value = self.apply(rho, u);
        let mut deps: DependencySet<U> = SmallVec::new();
        for e in self.graph.ingoing(u) {
            for s in self.graph.sources(&e) {
                if !deps.contains(&s) {
                    deps.push(s);
                }
            }
        }
        #[cfg(debug_assertions)]
        {
            use crate::assignment::TrackingAssignment;
            let proxy = TrackingAssignment::new(rho);
            let _ = derived_value(&self.graph, self.dom.as_ref(), self.base.as_ref(), &proxy, u);
            for read in proxy.into_log() {
                debug_assert!(
                    read == *u || deps.contains(&read),
                    "edge action read an unknown outside its declared sources"
                );
            }
        }
        (value, deps)
    }

    fn initial(&self) -> &InputAssignment<U, V> {
        &self.initial
    }

    fn is_input(&self, u: &U) -> bool {
        self.inputs.contains(u)
    }

    fn for_solving(&self) -> Self {
        Self {
            graph: self.graph.fresh(),
            dom: self.dom.clone(),
            unknowns: self.unknowns.clone(),
            inputs: self.inputs.clone(),
            initial: self.initial.clone(),
            base: self.base.clone(),
            tracer: self.tracer.clone(),
            _edge: PhantomData,
        }
    }
}

impl<U, V, E, G> FiniteEquationSystem<U, V> for GraphSystem<U, V, E, G>
where
    U: Clone + Eq + Hash + 'static,
    V: Clone + 'static,
    G: EquationGraph<U, V, E>,
{
    fn unknowns(&self) -> &[U] {
        &self.unknowns
    }

    fn infl(&self, u: &U) -> Vec<U> {
        self.graph
            .outgoing(u)
            .iter()
            .map(|e| self.graph.target(e))
            .collect()
    }
}
