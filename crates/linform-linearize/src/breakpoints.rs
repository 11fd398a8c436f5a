//! Breakpoint placement for piecewise-linear approximation.
//!
//! Produces `segments + 1` strictly increasing points spanning the domain.
//! Adaptive placement samples the function densely, weights interior sample
//! points by a second-difference curvature estimate, and picks interior
//! breakpoints at weighted quantiles, so curvy regions get more segments.
//! The seeded variant draws from the same curvature distribution with a
//! reproducible PRNG.

use linform_expr::{BreakpointMethod, SampleFn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Oversampling factor for the curvature estimate.
const CURVATURE_SAMPLES_PER_SEGMENT: usize = 10;

/// Generate `segments + 1` breakpoints over `domain` for `sample`.
///
/// The endpoints are always included and the result is strictly increasing.
pub fn generate(
    domain: (f64, f64),
    sample: &SampleFn,
    segments: usize,
    method: BreakpointMethod,
) -> Vec<f64> {
    match method {
        BreakpointMethod::Uniform => uniform(domain, segments),
        BreakpointMethod::Adaptive => adaptive(domain, sample, segments),
        BreakpointMethod::Seeded(seed) => seeded(domain, sample, segments, seed),
    }
}

fn uniform(domain: (f64, f64), segments: usize) -> Vec<f64> {
    let (lo, hi) = domain;
    let width = hi - lo;
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        points.push(lo + width * (i as f64) / (segments as f64));
    }
    // Pin the last point to the exact domain edge.
    points[segments] = hi;
    points
}

fn adaptive(domain: (f64, f64), sample: &SampleFn, segments: usize) -> Vec<f64> {
    if segments < 2 {
        return uniform(domain, segments);
    }
    let (grid, weights) = curvature_weights(domain, sample, segments);
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return uniform(domain, segments);
    }

    let mut cumulative = Vec::with_capacity(weights.len());
    let mut running = 0.0;
    for w in &weights {
        running += w;
        cumulative.push(running);
    }

    // Interior breakpoint k sits at the k/segments weighted quantile.
    let mut interior = Vec::with_capacity(segments - 1);
    for k in 1..segments {
        let level = total * (k as f64) / (segments as f64);
        let index = cumulative
            .partition_point(|c| *c < level)
            .min(grid.len() - 1);
        interior.push(grid[index]);
    }
    assemble(domain, interior, segments)
}

fn seeded(domain: (f64, f64), sample: &SampleFn, segments: usize, seed: u64) -> Vec<f64> {
    if segments < 2 {
        return uniform(domain, segments);
    }
    let (grid, weights) = curvature_weights(domain, sample, segments);
    let Ok(dist) = WeightedIndex::new(&weights) else {
        return uniform(domain, segments);
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let interior: Vec<f64> = (0..segments - 1)
        .map(|_| grid[dist.sample(&mut rng)])
        .collect();
    assemble(domain, interior, segments)
}

/// Dense interior grid paired with curvature weights.
///
/// Weights are central second differences of the sampled values, floored at
/// a small positive value so flat regions still receive breakpoints.
fn curvature_weights(
    domain: (f64, f64),
    sample: &SampleFn,
    segments: usize,
) -> (Vec<f64>, Vec<f64>) {
    let (lo, hi) = domain;
    let dense = segments * CURVATURE_SAMPLES_PER_SEGMENT;
    let step = (hi - lo) / (dense as f64);

    let values: Vec<f64> = (0..=dense)
        .map(|i| sample.eval(lo + step * (i as f64)))
        .collect();

    let mut grid = Vec::with_capacity(dense - 1);
    let mut weights = Vec::with_capacity(dense - 1);
    for i in 1..dense {
        let curvature = (values[i - 1] - 2.0 * values[i] + values[i + 1]).abs();
        let weight = if curvature.is_finite() {
            curvature.max(1e-12)
        } else {
            1e-12
        };
        grid.push(lo + step * (i as f64));
        weights.push(weight);
    }
    (grid, weights)
}

/// Sort, dedup, and pad interior candidates into exactly `segments + 1`
/// strictly increasing points spanning the domain.
fn assemble(domain: (f64, f64), mut interior: Vec<f64>, segments: usize) -> Vec<f64> {
    let (lo, hi) = domain;
    let min_gap = (hi - lo) * 1e-9;

    interior.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut points = vec![lo];
    for candidate in interior {
        let last = *points.last().unwrap_or(&lo);
        if candidate - last > min_gap && hi - candidate > min_gap {
            points.push(candidate);
        }
    }
    points.push(hi);

    // Duplicates were dropped above; refill by splitting the widest gap.
    while points.len() < segments + 1 {
        let mut widest = 0;
        let mut width = 0.0;
        for i in 0..points.len() - 1 {
            let gap = points[i + 1] - points[i];
            if gap > width {
                width = gap;
                widest = i;
            }
        }
        let midpoint = (points[widest] + points[widest + 1]) / 2.0;
        points.insert(widest + 1, midpoint);
    }
    points
}

/// Worst-case gap between the function and its piecewise-linear interpolant
/// over the breakpoints, probed on a dense grid.
pub fn max_interpolation_error(sample: &SampleFn, breakpoints: &[f64]) -> f64 {
    let mut worst = 0.0_f64;
    for window in breakpoints.windows(2) {
        let (a, b) = (window[0], window[1]);
        let (fa, fb) = (sample.eval(a), sample.eval(b));
        for i in 0..=20 {
            let t = f64::from(i) / 20.0;
            let x = a + (b - a) * t;
            let interpolated = fa + (fb - fa) * t;
            let gap = (sample.eval(x) - interpolated).abs();
            if gap.is_finite() {
                worst = worst.max(gap);
            }
        }
    }
    worst
}
