// src/math_utils.rs
use ndarray::Array1;

/// `num` evenly spaced samples over `[start, stop]`, endpoints included.
///
/// Samples are `start + i * step` and the last one is pinned to `stop`, so
/// the upper bound is hit exactly rather than up to rounding.
pub fn linspace(start: f64, stop: f64, num: usize) -> Array1<f64> {
    match num {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values = Array1::from_shape_fn(num, |i| start + i as f64 * step);
            values[num - 1] = stop;
            values
        }
    }
}

/// Grid size that scales with a length: `max(floor, round(extent * per_unit))`.
pub fn scaled_count(extent: f64, per_unit: f64, floor: usize) -> usize {
    let scaled = (extent * per_unit).round();
    if scaled.is_finite() && scaled > floor as f64 {
        scaled as usize
    } else {
        floor
    }
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
