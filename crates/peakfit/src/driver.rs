//! Least-squares fit driver: region flattening, parameter seeding, and
//! result unpacking around the LM engine.

use crate::lm::{levenberg_marquardt, LmOutcome};
use crate::region::FitRegion;
use crate::shape::{eval_model, params_per_peak, ShapeModel};
use crate::{FitError, FittedPeak, PeakUncertainty};
use peakpick::half_height_distance;
use serde::{Deserialize, Serialize};
use spectrum_grid::GridView;

/// Options for the least-squares fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Iteration cap.
    pub max_iter: usize,
    /// Noise estimate; `None` uses 0.05 · max |y| over the region.
    pub noise: Option<f32>,
    /// Per-sample weights in region row-major order; `None` weighs all 1.
    pub weights: Option<Vec<f32>>,
    /// Populate per-peak uncertainties from the fit covariance.
    pub uncertainties: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iter: 20,
            noise: None,
            weights: None,
            uncertainties: false,
        }
    }
}

/// Fit K peaks of the chosen lineshape to the region samples.
///
/// Each seed is a fractional position of rank N. Initial heights read the
/// grid at the rounded seed; initial linewidths come from a half-height
/// walk (falling back to 1.0 when no crossing is found). Errors from the
/// engine (`Singular`, `DidNotConverge`) propagate unchanged.
pub fn fit_peaks(
    data: &[f32],
    shape: &[usize],
    region: &FitRegion,
    seeds: &[Vec<f32>],
    model: ShapeModel,
    options: &FitOptions,
) -> Result<Vec<FittedPeak>, FitError> {
    let grid = GridView::new(data, shape).map_err(|e| FitError::InvalidShape(e.to_string()))?;
    region.validate(&grid)?;
    let ndim = grid.ndim();
    if seeds.is_empty() {
        return Err(FitError::InvalidSeeds("no seed positions given".into()));
    }
    for (k, seed) in seeds.iter().enumerate() {
        if seed.len() != ndim {
            return Err(FitError::InvalidSeeds(format!(
                "seed {} has rank {}, grid has rank {}",
                k,
                seed.len(),
                ndim
            )));
        }
    }
    let nsamples = region.sample_count();
    if let Some(w) = &options.weights {
        if w.len() != nsamples {
            return Err(FitError::InvalidRegion(format!(
                "{} weights for {} region samples",
                w.len(),
                nsamples
            )));
        }
    }

    // Flatten the region row-major; the model sees fractional grid
    // coordinates per sample.
    let mut y = Vec::with_capacity(nsamples);
    let mut coords: Vec<Vec<f32>> = Vec::with_capacity(nsamples);
    for j in 0..nsamples {
        let idx = region.coords_of(j);
        y.push(grid.get(&idx) as f64);
        coords.push(idx.iter().map(|&u| u as f32).collect());
    }

    let params = seed_parameters(&grid, region, seeds);
    let noise = options
        .noise
        .map(f64::from)
        .unwrap_or_else(|| 0.05 * y.iter().fold(0.0f64, |acc, v| acc.max(v.abs())));
    let weights: Option<Vec<f64>> = options
        .weights
        .as_ref()
        .map(|w| w.iter().map(|&v| v as f64).collect());

    let outcome = levenberg_marquardt(
        &y,
        weights.as_deref(),
        &params,
        options.max_iter,
        noise,
        |j, a, deriv| eval_model(model, a, &coords[j], region, deriv),
    )?;
    log::debug!(
        "{} fit of {} peaks converged after {} iterations, chi2 = {:.3e}",
        model,
        seeds.len(),
        outcome.iterations,
        outcome.chisq
    );

    Ok(unpack(&outcome, ndim, seeds.len(), options.uncertainties))
}

/// Pack `[h, p₀…p_{N−1}, w₀…w_{N−1}]` per peak from the grid.
fn seed_parameters(grid: &GridView, region: &FitRegion, seeds: &[Vec<f32>]) -> Vec<f64> {
    let ndim = region.ndim();
    let mut params = Vec::with_capacity(seeds.len() * params_per_peak(ndim));
    for seed in seeds {
        let mut idx = vec![0usize; ndim];
        for i in 0..ndim {
            let lo = region.first[i];
            let hi = region.last[i] - 1;
            idx[i] = (seed[i].round() as i32).clamp(lo, hi) as usize;
        }
        let height = grid.get(&idx);
        params.push(height as f64);
        for &s in seed.iter() {
            params.push(s as f64);
        }
        for i in 0..ndim {
            let maxima = height >= 0.0;
            let left = half_height_distance(grid, &idx, i, -1, height, maxima);
            let right = half_height_distance(grid, &idx, i, 1, height, maxima);
            let width = match (left, right) {
                (Some(l), Some(r)) => l + r,
                _ => 1.0,
            };
            params.push(width.max(1e-3) as f64);
        }
    }
    params
}

fn unpack(
    outcome: &LmOutcome,
    ndim: usize,
    npeaks: usize,
    uncertainties: bool,
) -> Vec<FittedPeak> {
    let ppp = params_per_peak(ndim);
    let mut out = Vec::with_capacity(npeaks);
    for k in 0..npeaks {
        let p = &outcome.params[k * ppp..(k + 1) * ppp];
        let uncertainty = if uncertainties {
            let c = &outcome.covar_diag[k * ppp..(k + 1) * ppp];
            let sigma = |v: f64| (outcome.chisq * v.max(0.0)).sqrt() as f32;
            Some(PeakUncertainty {
                height: sigma(c[0]),
                position: (0..ndim).map(|i| sigma(c[1 + i])).collect(),
                linewidth: (0..ndim).map(|i| sigma(c[1 + ndim + i])).collect(),
            })
        } else {
            None
        };
        out.push(FittedPeak {
            height: p[0] as f32,
            position: (0..ndim).map(|i| p[1 + i] as f32).collect(),
            // The lineshapes are even in w; report the magnitude.
            linewidth: (0..ndim).map(|i| p[1 + ndim + i].abs() as f32).collect(),
            uncertainty,
        });
    }
    out
}
