//! Sign analysis of a tiny counting loop
//!
//! The analyzed program is
//!
//! ```text
//! p0: x := 1
//! p1: while cond {      // join of p0 and the loop body
//! p2:     x := x + 1
//! p3: }                 // observes the loop-head state
//! ```
//!
//! Unknowns are program points, values are the sign of `x` at that point.
//! The loop head gets a localized widening on its back edge; with the sign
//! lattice this is overkill, but it shows the shape of a real analysis.

use std::rc::Rc;

use kleene::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Bot,
    Pos,
    Top,
}

impl Sign {
    fn join(self, other: Sign) -> Sign {
        match (self, other) {
            (Sign::Bot, s) | (s, Sign::Bot) => s,
            (a, b) if a == b => a,
            _ => Sign::Top,
        }
    }

    /// Sign of `x + 1` given the sign of `x`.
    fn bump(self) -> Sign {
        match self {
            Sign::Bot => Sign::Bot,
            Sign::Pos => Sign::Pos,
            Sign::Top => Sign::Top,
        }
    }
}

fn sign_domain() -> Rc<dyn Domain<Sign>> {
    Rc::new(FnDomain::new(
        |x: &Sign, y: &Sign| x == y || *x == Sign::Bot || *y == Sign::Top,
        |x: &Sign, y: &Sign| x.join(*y),
    ))
}

fn loop_system() -> GraphSystem<u32, Sign, EdgeId, EdgeListGraph<u32, Sign>> {
    let graph = GraphBuilder::new()
        .edge(vec![], 0, |_: &dyn Assignment<u32, Sign>| Sign::Pos)
        .edge(vec![0], 1, |rho: &dyn Assignment<u32, Sign>| rho.get(&0))
        .edge(vec![2], 1, |rho: &dyn Assignment<u32, Sign>| rho.get(&2))
        .edge(vec![1], 2, |rho: &dyn Assignment<u32, Sign>| {
            rho.get(&1).bump()
        })
        .edge(vec![1], 3, |rho: &dyn Assignment<u32, Sign>| rho.get(&1))
        .build();

    GraphSystem::new(
        graph,
        sign_domain(),
        vec![0, 1, 2, 3],
        vec![0],
        InputAssignment::constant(Sign::Bot),
    )
    .expect("inputs are program points")
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let widen: BoxFn<Sign> = Rc::new(|_: &Sign, _: &Sign| Sign::Top);
    let eqs = loop_system().with_localized_boxes(
        BoxAssignment::selective(move |u: &u32| (*u == 1).then(|| widen.clone()), true),
        Rc::new(NaturalOrder),
    );

    // One traced solve for the log, one counted solve for the report: the
    // system is immutable and can be solved any number of times.
    let traced = WorklistSolver::solve(&eqs, InputAssignment::constant(Sign::Bot), &LoggingSolverTracer);
    for point in 0..4u32 {
        println!("p{point}: x is {:?}", traced.get(&point));
    }

    let tracer = CountingTracer::new();
    let solution = WorklistSolver::solve(&eqs, InputAssignment::constant(Sign::Bot), &tracer);
    let report = SolveReport::from_tracer(&tracer, &solution);
    println!("{}", serde_json::to_string_pretty(&report).expect("report serializes"));
}
