// scripts/benchmark.rs
use hjb_control::analytics::{DomainPolicy, FirstBestEvaluator};
use hjb_control::logging::init_logging;
use hjb_control::math_utils::Timer;
use hjb_control::models::CATALOG;
use hjb_control::solvers::{SecondBestSolver, SolverConfig};
use std::env;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rayon_threads: usize,
    solver: SolverConfig,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rayon_threads: rayon::current_num_threads(),
            solver: SolverConfig::default(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    grid: (usize, usize),
    time_ms: f64,
    throughput_points_per_sec: f64,
    value_at_origin: f64,
    clamped_points: Option<usize>,
}

fn run_first_best_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    for scenario in CATALOG.iter() {
        println!("Benchmarking first best for scenario {}...", scenario.index);
        let evaluator = FirstBestEvaluator::new(scenario.params, DomainPolicy::Propagate)
            .expect("Valid parameters");

        let mut timer = Timer::new();
        timer.start();
        let solution = evaluator.evaluate_grid().expect("Propagate policy never fails");
        let time_ms = timer.elapsed_ms();

        let (n_times, n_states) = solution.grid.shape();
        let points = (n_times * n_states) as f64;
        results.push(BenchmarkResult {
            name: format!("First best #{} {}", scenario.index, scenario.name),
            grid: (n_times, n_states),
            time_ms,
            throughput_points_per_sec: points / (time_ms / 1000.0),
            value_at_origin: solution.value[[0, 0]],
            clamped_points: None,
        });
    }
    results
}

fn run_second_best_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    for scenario in CATALOG.iter() {
        println!("Benchmarking second best for scenario {}...", scenario.index);
        let solver = SecondBestSolver::new(scenario.params).expect("Valid parameters");

        let mut timer = Timer::new();
        timer.start();
        let solution = solver.solve().expect("Solve should succeed");
        let time_ms = timer.elapsed_ms();

        let res = solution.resolution;
        let updates = (res.n_t * (res.n_y - 1)) as f64;
        let mid = res.n_y / 2;
        results.push(BenchmarkResult {
            name: format!("Second best #{} {}", scenario.index, scenario.name),
            grid: (res.n_t + 1, res.n_y + 1),
            time_ms,
            throughput_points_per_sec: updates / (time_ms / 1000.0),
            value_at_origin: solution.value[[0, mid]],
            clamped_points: Some(solution.clamped_points),
        });
    }
    results
}

fn main() {
    init_logging("warn");

    println!("hjb-control Benchmark Suite");
    println!("===========================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!(
        "  Solver: {} time steps/unit, {} state steps/unit, {} controls",
        system_info.solver.time_steps_per_unit,
        system_info.solver.state_steps_per_unit,
        system_info.solver.control_samples
    );
    println!(
        "  Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    let mut all_results = run_first_best_benchmarks();
    all_results.extend(run_second_best_benchmarks());

    println!("\n{:=<96}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<96}", "");
    println!(
        "{:<42} {:>12} {:>12} {:>14} {:>12} {:>8}",
        "Benchmark", "Grid", "Time (ms)", "Points/s", "u(0, y)", "Clamped"
    );
    println!("{:-<96}", "");

    for result in &all_results {
        println!(
            "{:<42} {:>12} {:>12.2} {:>14.0} {:>12.6} {:>8}",
            result.name,
            format!("{}x{}", result.grid.0, result.grid.1),
            result.time_ms,
            result.throughput_points_per_sec,
            result.value_at_origin,
            result
                .clamped_points
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        );
    }

    println!("{:=<96}", "");
    println!("\nTo reproduce these results: cargo run --bin benchmark --release");
}
