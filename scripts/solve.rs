// scripts/solve.rs
//! Solve a catalog scenario and render it to stdout.
//!
//! Usage:
//!   hjb-solve [OPTIONS]
//!
//! Options:
//!   --scenario <N>     Catalog index 0..=5 (default: 5)
//!   --diagnostics      Also render the second-best diagnostic fields
//!   --fail-fast        Abort on closed-form domain errors instead of propagating NaN/-inf
//!   --all              Solve every catalog scenario
//!
//! Example:
//!   hjb-solve --scenario 3 --diagnostics

use clap::Parser;
use hjb_control::analytics::DomainPolicy;
use hjb_control::logging::init_logging;
use hjb_control::models::{CATALOG, DEFAULT_SCENARIO};
use hjb_control::orchestrator::{
    render_run, run_catalog, run_scenario, DiagnosticsConfig, RunConfig, ScenarioRun,
};
use hjb_control::output::{CanvasConfig, TextRenderer};
use hjb_control::ControlResult;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "hjb-solve")]
#[command(version, about = "First-best and second-best solutions of the retirement control problem")]
struct Cli {
    /// Catalog scenario index
    #[arg(short, long, default_value_t = DEFAULT_SCENARIO)]
    scenario: usize,

    /// Render max_term, dy_u, dyy_u and z* as well
    #[arg(short, long)]
    diagnostics: bool,

    /// Fail on negative discriminants and infeasible states
    #[arg(long)]
    fail_fast: bool,

    /// Solve and render every catalog scenario
    #[arg(long)]
    all: bool,

    /// Width of the text canvas
    #[arg(long, default_value_t = 72)]
    width: usize,

    /// Height of the text canvas
    #[arg(long, default_value_t = 24)]
    height: usize,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn print_header(run: &ScenarioRun) {
    let p = run.scenario.params;
    println!(
        "Scenario {} ({}): {}",
        run.scenario.index, run.scenario.name, run.scenario.description
    );
    println!(
        "Parameters: gamma={}, kappa={}, k={}, T={}, M={}, sigma={}",
        p.gamma, p.kappa, p.k, p.horizon, p.m, p.sigma
    );
    println!(
        "Retirement threshold {:.6} vs absorption bound {:.6}: does_retire={}\n",
        run.retirement.threshold, run.retirement.absorption_bound, run.retirement.does_retire
    );
}

fn run(cli: &Cli) -> ControlResult<()> {
    let cfg = RunConfig {
        scenario: cli.scenario,
        diagnostics: if cli.diagnostics {
            DiagnosticsConfig::ALL
        } else {
            DiagnosticsConfig::NONE
        },
        policy: if cli.fail_fast {
            DomainPolicy::FailFast
        } else {
            DomainPolicy::Propagate
        },
        ..Default::default()
    };
    let canvas = CanvasConfig {
        width: cli.width,
        height: cli.height,
    };
    let mut renderer = TextRenderer::new(std::io::stdout().lock(), canvas)?;

    let runs = if cli.all {
        run_catalog(&cfg)
    } else {
        vec![run_scenario(&cfg)]
    };
    for (index, result) in runs.into_iter().enumerate() {
        match result {
            Ok(run) => {
                print_header(&run);
                render_run(&run, cfg.diagnostics, &mut renderer)?;
            }
            Err(e) if cli.all => {
                tracing::error!(scenario = CATALOG[index].index, error = %e, "scenario failed");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
