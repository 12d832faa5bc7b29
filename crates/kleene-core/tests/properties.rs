//! Property-based checks of the decoration algebra

use std::collections::HashMap;
use std::rc::Rc;

use quickcheck::quickcheck;

use kleene_core::{
    Assignment, Body, BoxAssignment, BoxFn, EquationSystem, FiniteSystem, InputAssignment,
    MutableAssignment, NullTracer, PartialAssignment, SimpleSystem, WorklistSolver,
};

fn assignment_from(pairs: &[(u8, i32)], default: i32) -> MutableAssignment<u8, i32> {
    let mut rho = MutableAssignment::new(InputAssignment::constant(default));
    for (u, v) in pairs {
        rho.set(*u, *v);
    }
    rho
}

/// The body every property below decorates: reads the unknown itself and
/// its successor.
fn probe_body() -> Body<u8, i32> {
    Body::from_fn(|rho: &dyn Assignment<u8, i32>, u: &u8| {
        rho.get(u).wrapping_add(rho.get(&u.wrapping_add(1)))
    })
}

quickcheck! {
    fn prop_identity_body_mirrors_assignment(pairs: Vec<(u8, i32)>, u: u8) -> bool {
        let rho = assignment_from(&pairs, -7);
        Body::<u8, i32>::identity().apply(&rho, &u) == rho.get(&u)
    }

    fn prop_base_assignment_combines_exactly_where_defined(
        pairs: Vec<(u8, i32)>,
        init: Vec<(u8, i32)>,
        u: u8
    ) -> bool {
        let rho = assignment_from(&pairs, 0);
        let init_map: HashMap<u8, i32> = init.into_iter().collect();
        let body = probe_body();
        let decorated = body.with_base_assignment(
            PartialAssignment::from_map(init_map.clone()),
            Rc::new(|a: &i32, b: &i32| a.wrapping_add(*b)),
        );

        let plain = body.apply(&rho, &u);
        let expected = match init_map.get(&u) {
            Some(base) => base.wrapping_add(plain),
            None => plain,
        };
        decorated.apply(&rho, &u) == expected
    }

    fn prop_box_assignment_combines_old_and_computed(pairs: Vec<(u8, i32)>, u: u8) -> bool {
        let rho = assignment_from(&pairs, 1);
        let body = probe_body();
        let max: BoxFn<i32> = Rc::new(|x: &i32, y: &i32| (*x).max(*y));
        let decorated = body.with_box_assignment(BoxAssignment::selective(
            move |u: &u8| if u % 2 == 0 { Some(max.clone()) } else { None },
            true,
        ));

        let plain = body.apply(&rho, &u);
        let expected = if u % 2 == 0 { rho.get(&u).max(plain) } else { plain };
        decorated.apply(&rho, &u) == expected
    }

    fn prop_empty_boxes_decorate_to_the_same_body(u: u8, pairs: Vec<(u8, i32)>) -> bool {
        let body = probe_body();
        let decorated = body.with_box_assignment(BoxAssignment::empty());
        let rho = assignment_from(&pairs, 3);
        body == decorated && body.apply(&rho, &u) == decorated.apply(&rho, &u)
    }

    fn prop_assignments_agreeing_on_dependencies_agree_on_value(
        pairs: Vec<(u8, i32)>,
        noise: Vec<(u8, i32)>,
        u: u8
    ) -> bool {
        let eqs = SimpleSystem::new(probe_body(), InputAssignment::constant(0), |_| false);
        let rho = assignment_from(&pairs, 0);
        let (value, deps) = eqs.apply_with_dependencies(&rho, &u);

        // Perturb everything outside the reported dependency set.
        let mut other = assignment_from(&pairs, 0);
        for (n, v) in &noise {
            if !deps.contains(n) {
                other.set(*n, *v);
            }
        }
        eqs.apply(&other, &u) == value
    }

    fn prop_solver_solution_is_a_fixpoint(seeds: Vec<(u8, i32)>) -> bool {
        // Saturating maximum propagation along a ring of 8 unknowns.
        let seed_map: HashMap<u8, i32> = seeds
            .into_iter()
            .map(|(u, v)| (u % 8, v.rem_euclid(100)))
            .collect();
        let eqs = FiniteSystem::new(
            Body::from_fn(move |rho: &dyn Assignment<u8, i32>, u: &u8| {
                let seed = seed_map.get(u).copied().unwrap_or(0);
                seed.max(rho.get(&((u + 1) % 8)))
            }),
            InputAssignment::constant(0),
            (0..8).collect(),
            vec![],
            |u| vec![(u + 7) % 8],
        )
        .unwrap();

        let rho = WorklistSolver::solve(&eqs, InputAssignment::constant(0), &NullTracer);
        (0..8u8).all(|u| eqs.apply(&rho, &u) == rho.get(&u))
    }
}
