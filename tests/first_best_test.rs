// tests/first_best_test.rs
use approx::assert_relative_eq;
use hjb_control::analytics::{DomainPolicy, FirstBestEvaluator};
use hjb_control::models::scenario;
use hjb_control::DomainErrorKind;

fn evaluator(index: usize, policy: DomainPolicy) -> FirstBestEvaluator {
    FirstBestEvaluator::new(scenario(index).expect("Catalog index").params, policy)
        .expect("Valid parameters")
}

#[test]
fn test_grid_shape_and_values() {
    let fb = evaluator(0, DomainPolicy::Propagate);
    let solution = fb.evaluate_grid().expect("Propagate policy never fails");

    // Y_max = 1 - e^-1 ≈ 0.632 → 632 state samples, 500 time samples
    let expected_states = ((1.0 - (-1.0f64).exp()) * 1000.0).round() as usize;
    assert_eq!(solution.grid.shape(), (500, expected_states));
    assert_eq!(solution.value.dim(), (500, expected_states));

    for n in [0, 123, 499] {
        for j in [0, 17, expected_states - 1] {
            let (t, y) = solution.grid.coordinate(n, j);
            assert_eq!(Ok(solution.value[[n, j]]), fb.evaluate_point(t, y));
        }
    }

    // u(t, 0) with the binding control is a finite number
    assert!(solution.value[[0, 0]].is_finite());
    assert!(solution.grid.times.iter().all(|&t| t < 1.0));
}

#[test]
fn test_value_near_horizon_approaches_terminal_condition() {
    let fb = evaluator(2, DomainPolicy::Propagate);
    let gamma = fb.params().gamma;
    let t = 1.0 - 1e-5;
    for y in [0.1, 0.3, 0.6] {
        let near = fb.evaluate_point(t, y).expect("Propagate policy never fails");
        let terminal = (1.0 / gamma) * (1.0 - gamma * y).ln();
        println!("y={}: u(T-ε)={} u(T)={}", y, near, terminal);
        assert_relative_eq!(near, terminal, epsilon = 1e-3);
    }
}

#[test]
fn test_retirement_region_above_threshold() {
    // scenario 4: threshold = 0.7/0.3 ≈ 2.333 < Y_max ≈ 2.590
    let fb = evaluator(4, DomainPolicy::Propagate);
    let solution = fb.evaluate_grid().expect("Propagate policy never fails");
    let threshold = fb.params().retirement_threshold();

    let mut checked = 0;
    for (j, &y) in solution.grid.states.iter().enumerate() {
        if y > threshold {
            let t = solution.grid.times[250];
            assert_eq!(solution.value[[250, j]], fb.value_function(t, y, 0.0));
            checked += 1;
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_crossing_curve_without_retirement() {
    let fb = evaluator(1, DomainPolicy::Propagate);
    let solution = fb.evaluate_grid().expect("Propagate policy never fails");

    println!("\nCrossing points: {}", solution.crossing.len());
    assert!(solution.crossing.len() <= solution.grid.times.len());

    let mut last_t = f64::NEG_INFINITY;
    for p in &solution.crossing {
        assert!(p.t > last_t, "at most one crossing point per time sample");
        last_t = p.t;
        let gap = fb.optimal_control_unconstrained(p.t, p.y)
            - fb.optimal_control_at_absorption_boundary(p.t, p.y);
        assert!(gap.abs() < 1e-3);

        // it is the first such state for that time
        for &y in solution.grid.states.iter().take_while(|&&y| y < p.y) {
            let gap = fb.optimal_control_unconstrained(p.t, y)
                - fb.optimal_control_at_absorption_boundary(p.t, y);
            assert!(!(gap.abs() < 1e-3));
        }
    }
}

#[test]
fn test_fail_fast_policy() {
    let fb = evaluator(0, DomainPolicy::FailFast);

    // the grid stays inside the feasible region, so fail-fast agrees with propagate
    let strict = fb.evaluate_grid().expect("Grid is feasible");
    let loose = evaluator(0, DomainPolicy::Propagate)
        .evaluate_grid()
        .expect("Propagate policy never fails");
    assert_eq!(strict.value, loose.value);

    let err = fb.evaluate_point(0.0, fb.y_max() * 1.5).unwrap_err();
    assert_eq!(err.kind, DomainErrorKind::InfeasibleState);

    let err = fb
        .checked_optimal_control_at_absorption_boundary(1.0, 0.1)
        .unwrap_err();
    assert_eq!(err.kind, DomainErrorKind::DivisionSingularity);
}
