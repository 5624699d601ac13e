// src/orchestrator.rs
//! Scenario selection, solver invocation and rendering.
//!
//! A run is strictly sequential: the first-best grid is evaluated to
//! completion, then the second-best sweep, then everything is handed to a
//! [`Renderer`]. [`run_catalog`] runs independent scenarios side by side;
//! nothing is shared between runs.

use crate::analytics::{DomainPolicy, FirstBestEvaluator, FirstBestSolution};
use crate::error::ControlResult;
use crate::models::{scenario, RetirementClassification, Scenario, CATALOG, DEFAULT_SCENARIO};
use crate::output::{ContourPlot, Overlay, Renderer, SurfacePlot};
use crate::solvers::{SecondBestSolution, SecondBestSolver, SolverConfig};
use bitflags::bitflags;
use rayon::prelude::*;
use tracing::info;

bitflags! {
    /// Which second-best diagnostic fields get rendered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DiagnosticsConfig: u32 {
        const NONE     = 0;
        const MAX_TERM = 1 << 0;
        const DY_U     = 1 << 1;
        const DYY_U    = 1 << 2;
        const Z_STAR   = 1 << 3;
        const ALL = Self::MAX_TERM.bits()
            | Self::DY_U.bits()
            | Self::DYY_U.bits()
            | Self::Z_STAR.bits();
    }
}

const RETIREMENT_LABEL: &str = "y = (1 - kappa)/gamma";
const CROSSING_LABEL: &str = "alpha* = alpha^M";

#[derive(Clone, Copy, Debug)]
pub struct RunConfig {
    pub scenario: usize,
    pub diagnostics: DiagnosticsConfig,
    pub policy: DomainPolicy,
    pub solver: SolverConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenario: DEFAULT_SCENARIO,
            diagnostics: DiagnosticsConfig::NONE,
            policy: DomainPolicy::Propagate,
            solver: SolverConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> ControlResult<()> {
        scenario(self.scenario)?;
        self.solver.validate()
    }
}

/// Everything computed for one scenario.
#[derive(Clone, Debug)]
pub struct ScenarioRun {
    pub scenario: Scenario,
    pub retirement: RetirementClassification,
    pub first_best: FirstBestSolution,
    pub second_best: SecondBestSolution,
}

/// Select the configured scenario and solve both regimes.
pub fn run_scenario(cfg: &RunConfig) -> ControlResult<ScenarioRun> {
    cfg.validate()?;
    solve_scenario(scenario(cfg.scenario)?, cfg)
}

/// Solve every catalog scenario as an independent run.
pub fn run_catalog(cfg: &RunConfig) -> Vec<ControlResult<ScenarioRun>> {
    CATALOG
        .par_iter()
        .map(|s| {
            cfg.solver.validate()?;
            solve_scenario(*s, cfg)
        })
        .collect()
}

fn solve_scenario(selected: Scenario, cfg: &RunConfig) -> ControlResult<ScenarioRun> {
    let params = selected.params;
    params.validate()?;
    let retirement = params.retirement();
    info!(
        scenario = selected.index,
        name = selected.name,
        gamma = params.gamma,
        kappa = params.kappa,
        k = params.k,
        horizon = params.horizon,
        m = params.m,
        sigma = params.sigma,
        does_retire = retirement.does_retire,
        "running scenario"
    );

    let first_best = FirstBestEvaluator::new(params, cfg.policy)?.evaluate_grid()?;
    let second_best = SecondBestSolver::with_config(params, cfg.solver)?.solve()?;

    Ok(ScenarioRun {
        scenario: selected,
        retirement,
        first_best,
        second_best,
    })
}

/// Hand a finished run to `renderer` in display order.
pub fn render_run<R: Renderer>(
    run: &ScenarioRun,
    diagnostics: DiagnosticsConfig,
    renderer: &mut R,
) -> ControlResult<()> {
    let retirement_line = run
        .retirement
        .does_retire
        .then_some(Overlay::HorizontalLine {
            y: run.retirement.threshold,
            label: RETIREMENT_LABEL,
        });

    let fb = &run.first_best;
    let fb_overlay = retirement_line.or(Some(Overlay::Curve {
        points: &fb.crossing,
        label: CROSSING_LABEL,
    }));
    renderer.contour(&ContourPlot {
        title: "First best",
        colorbar_label: "u(t, y)",
        grid: &fb.grid,
        values: &fb.value,
        overlay: fb_overlay,
    })?;
    renderer.surface(&SurfacePlot {
        title: "3D First best",
        grid: &fb.grid,
        values: &fb.value,
    })?;

    let sb = &run.second_best;
    renderer.contour(&ContourPlot {
        title: "Second best",
        colorbar_label: "u(t, y)",
        grid: &sb.grid,
        values: &sb.value,
        overlay: None,
    })?;
    renderer.surface(&SurfacePlot {
        title: "3D Second best",
        grid: &sb.grid,
        values: &sb.value,
    })?;

    let d = &sb.diagnostics;
    let panels = [
        (
            DiagnosticsConfig::MAX_TERM,
            "Heatmap of the Hamiltonian",
            "max(0, max_term)",
            &d.max_term,
            None,
        ),
        (
            DiagnosticsConfig::DY_U,
            "Heatmap of dy_u",
            "du/dy",
            &d.dy_u,
            None,
        ),
        (
            DiagnosticsConfig::DYY_U,
            "Heatmap of dyy_u",
            "d2u/dy2",
            &d.dyy_u,
            None,
        ),
        (
            DiagnosticsConfig::Z_STAR,
            "Heatmap of z*",
            "z*",
            &d.z_star,
            retirement_line,
        ),
    ];
    for (flag, title, colorbar_label, values, overlay) in panels {
        if diagnostics.contains(flag) {
            renderer.contour(&ContourPlot {
                title,
                colorbar_label,
                grid: &sb.grid,
                values,
                overlay,
            })?;
        }
    }
    Ok(())
}
