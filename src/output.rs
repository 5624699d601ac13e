// src/output.rs
//! Rendering of computed fields.
//!
//! The orchestrator talks to a [`Renderer`]; [`TextRenderer`] draws contour
//! plots as character heatmaps and summarises surfaces slice by slice, writing
//! to any `io::Write` (stdout in the binaries).

use crate::analytics::CrossingPoint;
use crate::error::{ControlError, ControlResult};
use crate::grid::{finite_range, Grid};
use ndarray::Array2;
use std::io::Write;

/// Shading ramp from lowest to highest value.
const RAMP: &[u8] = b" .:-=+*#%@";
const LINE_GLYPH: char = '-';
const CURVE_GLYPH: char = 'o';

/// Something drawn on top of a contour plot.
#[derive(Clone, Copy, Debug)]
pub enum Overlay<'a> {
    HorizontalLine { y: f64, label: &'a str },
    Curve {
        points: &'a [CrossingPoint],
        label: &'a str,
    },
}

/// A filled contour of `values` over `grid` (time on x, state on y).
#[derive(Clone, Copy, Debug)]
pub struct ContourPlot<'a> {
    pub title: &'a str,
    pub colorbar_label: &'a str,
    pub grid: &'a Grid,
    pub values: &'a Array2<f64>,
    pub overlay: Option<Overlay<'a>>,
}

/// A surface `u(t, y)` over `grid`.
#[derive(Clone, Copy, Debug)]
pub struct SurfacePlot<'a> {
    pub title: &'a str,
    pub grid: &'a Grid,
    pub values: &'a Array2<f64>,
}

pub trait Renderer {
    fn contour(&mut self, plot: &ContourPlot<'_>) -> ControlResult<()>;
    fn surface(&mut self, plot: &SurfacePlot<'_>) -> ControlResult<()>;
}

/// Character canvas size for [`TextRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 72,
            height: 24,
        }
    }
}

impl CanvasConfig {
    pub fn validate(&self) -> ControlResult<()> {
        for (field, size) in [("width", self.width), ("height", self.height)] {
            if !(2..=1000).contains(&size) {
                return Err(ControlError::InvalidConfiguration {
                    field: field.to_string(),
                    reason: "canvas size must be in 2..=1000".to_string(),
                });
            }
        }
        Ok(())
    }
}

pub struct TextRenderer<W: Write> {
    out: W,
    canvas: CanvasConfig,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, canvas: CanvasConfig) -> ControlResult<Self> {
        canvas.validate()?;
        Ok(Self { out, canvas })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Nearest index of `position` in `[0, 1]` on an axis of `len` samples.
fn nearest_index(position: f64, len: usize) -> usize {
    let idx = (position.clamp(0.0, 1.0) * (len - 1) as f64).round() as usize;
    idx.min(len - 1)
}

/// Fractional position of `x` within `[lo, hi]`, `None` outside.
fn axis_position(x: f64, lo: f64, hi: f64) -> Option<f64> {
    if !(x >= lo && x <= hi) {
        return None;
    }
    if hi > lo {
        Some((x - lo) / (hi - lo))
    } else {
        Some(0.0)
    }
}

fn shade(value: f64, lo: f64, hi: f64) -> char {
    if !value.is_finite() {
        return ' ';
    }
    let top = RAMP.len() - 1;
    let level = if hi > lo {
        (((value - lo) / (hi - lo)) * top as f64).floor() as usize
    } else {
        0
    };
    RAMP[level.min(top)] as char
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn contour(&mut self, plot: &ContourPlot<'_>) -> ControlResult<()> {
        let (width, height) = (self.canvas.width, self.canvas.height);
        let (n_times, n_states) = plot.grid.shape();
        if n_times == 0 || n_states == 0 {
            writeln!(self.out, "== {} == (empty grid)", plot.title)?;
            return Ok(());
        }
        let (t0, t1) = (plot.grid.times[0], plot.grid.times[n_times - 1]);
        let (y0, y1) = (plot.grid.states[0], plot.grid.states[n_states - 1]);
        let (lo, hi) = finite_range(plot.values).unwrap_or((0.0, 0.0));

        // row 0 is the top of the canvas, i.e. the largest state
        let mut canvas: Vec<Vec<char>> = (0..height)
            .map(|row| {
                let j = nearest_index((height - 1 - row) as f64 / (height - 1) as f64, n_states);
                (0..width)
                    .map(|col| {
                        let n = nearest_index(col as f64 / (width - 1) as f64, n_times);
                        shade(plot.values[[n, j]], lo, hi)
                    })
                    .collect()
            })
            .collect();

        let to_row = |y: f64| {
            axis_position(y, y0, y1).map(|p| height - 1 - nearest_index(p, height))
        };
        let overlay_label = match plot.overlay {
            Some(Overlay::HorizontalLine { y, label }) => {
                if let Some(row) = to_row(y) {
                    canvas[row].iter_mut().for_each(|c| *c = LINE_GLYPH);
                }
                Some((LINE_GLYPH, label))
            }
            Some(Overlay::Curve { points, label }) => {
                for p in points {
                    if let (Some(px), Some(row)) = (axis_position(p.t, t0, t1), to_row(p.y)) {
                        canvas[row][nearest_index(px, width)] = CURVE_GLYPH;
                    }
                }
                Some((CURVE_GLYPH, label))
            }
            None => None,
        };

        writeln!(self.out, "== {} ==", plot.title)?;
        writeln!(self.out, "y in [{:.4}, {:.4}]", y0, y1)?;
        for row in &canvas {
            writeln!(self.out, "|{}|", row.iter().collect::<String>())?;
        }
        writeln!(self.out, "t in [{:.4}, {:.4}]", t0, t1)?;
        writeln!(
            self.out,
            "{}: [{:.6}, {:.6}] ramp \"{}\"",
            plot.colorbar_label,
            lo,
            hi,
            std::str::from_utf8(RAMP).unwrap_or_default()
        )?;
        if let Some((glyph, label)) = overlay_label {
            writeln!(self.out, "'{}' {}", glyph, label)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn surface(&mut self, plot: &SurfacePlot<'_>) -> ControlResult<()> {
        let (n_times, n_states) = plot.grid.shape();
        writeln!(self.out, "== {} ==", plot.title)?;
        if n_times == 0 || n_states == 0 {
            writeln!(self.out, "(empty grid)")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "{:>10} {:>14} {:>14} {:>14} {:>8}",
            "t", "min u", "max u", "mean u", "finite"
        )?;
        let mut slices: Vec<usize> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .map(|&p| nearest_index(p, n_times))
            .collect();
        slices.dedup();
        for n in slices {
            let row = plot.values.row(n);
            let finite: Vec<f64> = row.iter().copied().filter(|v| v.is_finite()).collect();
            let (min, max) = finite
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            let mean = if finite.is_empty() {
                f64::NAN
            } else {
                finite.iter().sum::<f64>() / finite.len() as f64
            };
            writeln!(
                self.out,
                "{:>10.4} {:>14.6} {:>14.6} {:>14.6} {:>8}",
                plot.grid.times[n],
                min,
                max,
                mean,
                finite.len()
            )?;
        }
        if let Some((lo, hi)) = finite_range(plot.values) {
            writeln!(self.out, "u(t, y) in [{:.6}, {:.6}]", lo, hi)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}
