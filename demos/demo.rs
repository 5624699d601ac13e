// demos/demo.rs
use hjb_control::analytics::{DomainPolicy, FirstBestEvaluator};
use hjb_control::math_utils::Timer;
use hjb_control::models::{scenario, CATALOG};
use hjb_control::orchestrator::{render_run, run_scenario, DiagnosticsConfig, RunConfig};
use hjb_control::output::{CanvasConfig, TextRenderer};
use hjb_control::solvers::maximize_hamiltonian;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--catalog" {
        run_catalog_summary();
    } else {
        run_demo_mode();
    }
}

fn run_catalog_summary() {
    println!("Retirement classification for the scenario catalog\n");
    println!(
        "{:>3} {:<30} {:>10} {:>10} {:>8}",
        "#", "name", "threshold", "Y_max", "retires"
    );
    for s in CATALOG.iter() {
        let class = s.params.retirement();
        println!(
            "{:>3} {:<30} {:>10.4} {:>10.4} {:>8}",
            s.index, s.name, class.threshold, class.absorption_bound, class.does_retire
        );
    }
}

fn run_demo_mode() {
    println!("Running hjb-control Demo\n");

    let selected = scenario(3).expect("Catalog index");
    let params = selected.params;
    println!(
        "Scenario {}: gamma={}, kappa={}, k={}, T={}, M={}, sigma={}",
        selected.index, params.gamma, params.kappa, params.k, params.horizon, params.m, params.sigma
    );

    // Point evaluations of the closed form
    let fb = FirstBestEvaluator::new(params, DomainPolicy::Propagate).expect("Valid parameters");
    println!("\nFirst best at t = 0:");
    for y in [0.0, 0.5, 1.0, 2.0, 3.0] {
        let alpha_star = fb.optimal_control_unconstrained(0.0, y);
        let alpha_m = fb.optimal_control_at_absorption_boundary(0.0, y);
        let value = fb.evaluate_point(0.0, y).expect("Propagate policy never fails");
        println!(
            "  y={:.2}: alpha*={:>9.5} alpha^M={:>9.5} u={:>10.5}",
            y, alpha_star, alpha_m, value
        );
    }

    // A single Hamiltonian search
    let best = maximize_hamiltonian(-0.2, -1.0, params.sigma, params.k, params.kappa, params.kappa + 5.0);
    println!(
        "\nHamiltonian for u_y=-0.2, u_yy=-1.0: z*={:.4}, H={:.6}",
        best.z, best.value
    );

    // Full run with rendering
    let cfg = RunConfig {
        scenario: selected.index,
        diagnostics: DiagnosticsConfig::Z_STAR,
        ..Default::default()
    };
    let timer = Timer::new();
    let run = run_scenario(&cfg).expect("Valid configuration");
    println!(
        "\nSolved both regimes in {:.1} ms (second-best grid {}x{}, {} clamped points)\n",
        timer.elapsed_ms(),
        run.second_best.resolution.n_t + 1,
        run.second_best.resolution.n_y + 1,
        run.second_best.clamped_points
    );

    let mut renderer =
        TextRenderer::new(std::io::stdout(), CanvasConfig::default()).expect("Valid canvas");
    render_run(&run, cfg.diagnostics, &mut renderer).expect("Rendered");
}
