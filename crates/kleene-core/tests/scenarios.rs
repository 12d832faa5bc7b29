//! End-to-end solves over small concrete domains

use std::rc::Rc;

use kleene_core::{
    Assignment, Body, BoxAssignment, BoxFn, CadencedBoxes, Domain, EdgeId, EdgeListGraph,
    EquationSystem, FiniteEquationSystem, FiniteSystem, FnDomain, GraphBuilder, GraphSystem,
    InputAssignment, LocalSolver, NaturalOrder, NullTracer, PrioritySolver, RoundRobinSolver,
    SimpleSystem, WorklistSolver,
};

/// Four-point lattice bot < {a, b} < top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Bot,
    A,
    B,
    Top,
}

fn reach_domain() -> Rc<dyn Domain<Reach>> {
    Rc::new(FnDomain::new(
        |x: &Reach, y: &Reach| x == y || *x == Reach::Bot || *y == Reach::Top,
        |x: &Reach, y: &Reach| match (x, y) {
            (Reach::Bot, v) | (v, Reach::Bot) => *v,
            (a, b) if a == b => *a,
            _ => Reach::Top,
        },
    ))
}

fn reach_system() -> GraphSystem<&'static str, Reach, EdgeId, EdgeListGraph<&'static str, Reach>> {
    // x ← a, y ← x, y ← b.
    let graph = GraphBuilder::new()
        .edge(vec![], "x", |_: &dyn Assignment<&str, Reach>| Reach::A)
        .edge(vec!["x"], "y", |rho: &dyn Assignment<&str, Reach>| {
            rho.get(&"x")
        })
        .edge(vec![], "y", |_: &dyn Assignment<&str, Reach>| Reach::B)
        .build();
    GraphSystem::new(
        graph,
        reach_domain(),
        vec!["x", "y"],
        vec![],
        InputAssignment::constant(Reach::Bot),
    )
    .unwrap()
}

#[test]
fn test_two_unknown_lattice_solution() {
    let eqs = reach_system();
    let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(Reach::Bot), &NullTracer);
    assert_eq!(rho.get(&"x"), Reach::A);
    assert_eq!(rho.get(&"y"), Reach::Top);
}

#[test]
fn test_solution_is_a_fixpoint_and_resolving_changes_nothing() {
    let eqs = reach_system();
    let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(Reach::Bot), &NullTracer);

    // Every stored value equals its right-hand side.
    for u in eqs.unknowns() {
        assert_eq!(eqs.apply(&rho, u), rho.get(u));
    }

    // Running again from the solution is a no-op.
    let values: Vec<Reach> = eqs.unknowns().iter().map(|u| rho.get(u)).collect();
    let again = WorklistSolver::solve(
        &eqs,
        InputAssignment::from_fn(move |u: &&str| if *u == "x" { Reach::A } else { Reach::Top }),
        &NullTracer,
    );
    for (u, v) in eqs.unknowns().iter().zip(values) {
        assert_eq!(again.get(u), v);
    }
}

#[test]
fn test_all_solvers_agree_on_monotone_system() {
    let eqs = reach_system();
    let start = InputAssignment::constant(Reach::Bot);

    let fifo = WorklistSolver::solve(&eqs, start.clone(), &NullTracer);
    let sweep = RoundRobinSolver::solve(&eqs, start.clone(), &NullTracer);
    let prio = PrioritySolver::solve(
        &eqs,
        start.clone(),
        &NaturalOrder,
        |_: &Reach, _: &Reach| false,
        &NullTracer,
    );
    let local = LocalSolver::solve(&eqs, &["x", "y"], start, &NullTracer);

    for u in eqs.unknowns() {
        assert_eq!(fifo.get(u), sweep.get(u));
        assert_eq!(fifo.get(u), prio.get(u));
        assert_eq!(fifo.get(u), local.get(u));
    }
}

fn int_domain() -> Rc<dyn Domain<i64>> {
    Rc::new(FnDomain::new(
        |x: &i64, y: &i64| x <= y,
        |x: &i64, y: &i64| (*x).max(*y),
    ))
}

#[test]
fn test_localized_widening_terminates_diverging_loop() {
    // Self-loop x ← x + 1 would climb forever; the localized widening on
    // the back edge jumps to top and the solver stops after two rounds.
    let graph = GraphBuilder::new()
        .edge(vec![0], 0, |rho: &dyn Assignment<u32, i64>| {
            rho.get(&0).saturating_add(1)
        })
        .build();
    let top: BoxFn<i64> = Rc::new(|_: &i64, _: &i64| i64::MAX);
    let eqs = GraphSystem::new(
        graph,
        int_domain(),
        vec![0],
        vec![],
        InputAssignment::constant(0),
    )
    .unwrap()
    .with_localized_boxes(
        BoxAssignment::selective(move |_: &u32| Some(top.clone()), true),
        Rc::new(NaturalOrder),
    );

    let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
    assert_eq!(rho.get(&0), i64::MAX);
}

#[test]
fn test_warrowing_overshoots_then_recovers() {
    // The loop climbs to a ceiling of 10. Warrowing first widens the head
    // to top, then narrows back down once contributions stop escaping.
    let graph = GraphBuilder::new()
        .edge(vec![0], 0, |rho: &dyn Assignment<u32, i64>| {
            rho.get(&0).saturating_add(1).min(10)
        })
        .build();
    let top: BoxFn<i64> = Rc::new(|_: &i64, _: &i64| i64::MAX);
    let descend: BoxFn<i64> = Rc::new(|_: &i64, new: &i64| *new);
    let eqs = GraphSystem::new(
        graph,
        int_domain(),
        vec![0],
        vec![],
        InputAssignment::constant(0),
    )
    .unwrap()
    .with_localized_warrowing(
        BoxAssignment::selective(move |_: &u32| Some(top.clone()), true),
        BoxAssignment::selective(move |_: &u32| Some(descend.clone()), true),
        Rc::new(NaturalOrder),
    );

    let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
    assert_eq!(rho.get(&0), 10);
}

#[test]
fn test_cadenced_boxes_widen_then_narrow() {
    // Body climbs to 100; the cadenced assignment widens to top on the
    // first round, then narrows straight onto whatever the body computes.
    let widen: BoxFn<i64> = Rc::new(|_: &i64, _: &i64| i64::MAX);
    let narrow: BoxFn<i64> = Rc::new(|_: &i64, new: &i64| *new);
    let boxes = BoxAssignment::stateful(CadencedBoxes::new(widen, narrow, 1));

    let make = || {
        FiniteSystem::new(
            Body::from_fn(|rho: &dyn Assignment<u32, i64>, u: &u32| {
                rho.get(u).saturating_add(1).min(100)
            }),
            InputAssignment::constant(0),
            vec![0],
            vec![],
            |_| vec![0],
        )
        .unwrap()
    };
    let eqs = make().with_boxes(boxes);

    let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
    assert_eq!(rho.get(&0), 100);

    // The solver copied the stateful assignment: a second solve of the very
    // same system starts its cadence from scratch and agrees.
    let rho2 = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
    assert_eq!(rho2.get(&0), 100);
}

#[test]
fn test_local_solver_on_unbounded_system_with_boxes() {
    // Unknown n reads n + 1 below 1000 and otherwise itself; only the part
    // reachable from the wanted set is ever touched.
    let eqs = SimpleSystem::new(
        Body::from_fn(|rho: &dyn Assignment<u64, i64>, n: &u64| {
            if *n < 1000 {
                rho.get(&(n + 1)).saturating_add(1)
            } else {
                0
            }
        }),
        InputAssignment::constant(0),
        |_| false,
    );
    let rho = LocalSolver::solve(&eqs, &[997], InputAssignment::constant(0), &NullTracer);
    assert_eq!(rho.get(&997), 3);
    assert_eq!(rho.len(), 4);
    assert!(!rho.is_defined_at(&0));
}

#[test]
fn test_base_assignment_feeds_entry_points() {
    use kleene_core::PartialAssignment;

    // y ← x with nothing defining x; the base assignment seeds x.
    let graph = GraphBuilder::new()
        .edge(vec!["x"], "y", |rho: &dyn Assignment<&str, Reach>| {
            rho.get(&"x")
        })
        .build();
    let eqs = GraphSystem::new(
        graph,
        reach_domain(),
        vec!["x", "y"],
        vec!["x"],
        InputAssignment::constant(Reach::Bot),
    )
    .unwrap()
    .with_base_assignment(
        PartialAssignment::from_pairs([("x", Reach::A)]),
        Rc::new(|base: &Reach, computed: &Reach| base.join_with(computed)),
    );

    let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(Reach::Bot), &NullTracer);
    assert_eq!(rho.get(&"x"), Reach::A);
    assert_eq!(rho.get(&"y"), Reach::A);
}

impl Reach {
    fn join_with(&self, other: &Reach) -> Reach {
        match (self, other) {
            (Reach::Bot, v) | (v, Reach::Bot) => *v,
            (a, b) if a == b => *a,
            _ => Reach::Top,
        }
    }
}
