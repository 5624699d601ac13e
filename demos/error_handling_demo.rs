// demos/error_handling_demo.rs
use hjb_control::analytics::{DomainPolicy, FirstBestEvaluator};
use hjb_control::orchestrator::{run_scenario, RunConfig};
use hjb_control::solvers::{SecondBestSolver, SolverConfig};
use hjb_control::{ControlError, ScenarioParameters};

fn main() {
    println!("Error Handling Demo for hjb-control");
    println!("===================================\n");

    // Test 1: Degenerate absorption bound
    println!("1. Testing M <= 0...");
    let degenerate = ScenarioParameters::new(1.0, 0.3, 1.0, 1.0, 0.0, 0.3);
    match SecondBestSolver::new(degenerate) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: Degenerate horizon
    println!("\n2. Testing T <= 0...");
    let no_horizon = ScenarioParameters::new(1.0, 0.3, 1.0, -1.0, 1.0, 0.3);
    match FirstBestEvaluator::new(no_horizon, DomainPolicy::Propagate) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 3: Unknown scenario
    println!("\n3. Testing an out-of-range scenario index...");
    let cfg = RunConfig {
        scenario: 42,
        ..Default::default()
    };
    match run_scenario(&cfg) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 4: Bad solver resolution
    println!("\n4. Testing a solver with a single control sample...");
    let params = ScenarioParameters::new(1.0, 0.3, 1.0, 1.0, 1.0, 0.3);
    match SecondBestSolver::with_config(params, SolverConfig::default().with_control_samples(1)) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 5: Propagate vs fail-fast at an infeasible state
    println!("\n5. Evaluating above the absorption bound...");
    let propagate =
        FirstBestEvaluator::new(params, DomainPolicy::Propagate).expect("Valid parameters");
    let y = propagate.y_max() + 0.1;
    println!("   Propagate: u = {:?}", propagate.evaluate_point(0.5, y));

    let strict = FirstBestEvaluator::new(params, DomainPolicy::FailFast).expect("Valid parameters");
    match strict.evaluate_point(0.5, y) {
        Ok(v) => println!("   Unexpected value: {}", v),
        Err(e) => println!("   ✓ Fail-fast: {}", ControlError::from(e)),
    }

    // Test 6: Closed-form control at the horizon
    println!("\n6. Evaluating alpha* at t = T...");
    match strict.checked_optimal_control_unconstrained(params.horizon, 0.2) {
        Ok(v) => println!("   Unexpected value: {}", v),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }
    println!(
        "   Unchecked value: {}",
        strict.optimal_control_unconstrained(params.horizon, 0.2)
    );

    println!("\n✓ Error handling demonstration complete!");
}
