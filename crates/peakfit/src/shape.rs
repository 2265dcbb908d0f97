//! Gaussian and Lorentzian peak-shape models with analytic derivatives.
//!
//! A multi-peak model is the sum of K independent shapes; each peak's
//! packed parameter block is `[h, p₀…p_{N−1}, w₀…w_{N−1}]` and its
//! derivatives are non-zero only inside its own block.

use crate::region::FitRegion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 4·ln 2, the half-width factor of both lineshapes.
pub(crate) const FOUR_LN2: f64 = 2.772588722239781;

/// Model value forced on every sample while any peak sits outside the fit
/// region by more than one cell; repels the step without box constraints.
pub(crate) const OUT_OF_REGION_PENALTY: f64 = 1e20;

/// Peak lineshape model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeModel {
    Gaussian,
    Lorentzian,
}

impl fmt::Display for ShapeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeModel::Gaussian => write!(f, "Gaussian"),
            ShapeModel::Lorentzian => write!(f, "Lorentzian"),
        }
    }
}

/// Packed parameters per peak for a rank-N model.
pub(crate) fn params_per_peak(ndim: usize) -> usize {
    1 + 2 * ndim
}

/// Evaluate the multi-peak model at one sample coordinate, writing
/// ∂y/∂aₚ for every packed parameter into `deriv`.
pub(crate) fn eval_model(
    model: ShapeModel,
    params: &[f64],
    coord: &[f32],
    region: &FitRegion,
    deriv: &mut [f64],
) -> f64 {
    let ndim = region.ndim();
    let ppp = params_per_peak(ndim);
    let npeaks = params.len() / ppp;

    for k in 0..npeaks {
        let p = &params[k * ppp..(k + 1) * ppp];
        for i in 0..ndim {
            let x = p[1 + i];
            if x < (region.first[i] - 1) as f64 || x > region.last[i] as f64 {
                deriv.fill(0.0);
                return OUT_OF_REGION_PENALTY;
            }
        }
    }

    deriv.fill(0.0);
    let mut total = 0.0;
    for k in 0..npeaks {
        let p = &params[k * ppp..(k + 1) * ppp];
        let d = &mut deriv[k * ppp..(k + 1) * ppp];
        let h = p[0];
        match model {
            ShapeModel::Gaussian => {
                let mut shape = 1.0f64;
                for i in 0..ndim {
                    let dx = coord[i] as f64 - p[1 + i];
                    let w = p[1 + ndim + i];
                    shape *= (-FOUR_LN2 * dx * dx / (w * w)).exp();
                }
                let y = h * shape;
                d[0] = shape;
                for i in 0..ndim {
                    let dx = coord[i] as f64 - p[1 + i];
                    let w = p[1 + ndim + i];
                    d[1 + i] = y * 2.0 * FOUR_LN2 * dx / (w * w);
                    d[1 + ndim + i] = y * 2.0 * FOUR_LN2 * dx * dx / (w * w * w);
                }
                total += y;
            }
            ShapeModel::Lorentzian => {
                let mut shape = 1.0f64;
                for i in 0..ndim {
                    let dx = coord[i] as f64 - p[1 + i];
                    let w = p[1 + ndim + i];
                    shape *= w * w / (w * w + 4.0 * dx * dx);
                }
                let y = h * shape;
                d[0] = shape;
                for i in 0..ndim {
                    let dx = coord[i] as f64 - p[1 + i];
                    let w = p[1 + ndim + i];
                    let den = w * w + 4.0 * dx * dx;
                    d[1 + i] = y * 8.0 * dx / den;
                    d[1 + ndim + i] = y * 8.0 * dx * dx / (w * den);
                }
                total += y;
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_gradient(
        model: ShapeModel,
        params: &[f64],
        coord: &[f32],
        region: &FitRegion,
    ) -> Vec<f64> {
        let mut grad = Vec::with_capacity(params.len());
        let mut scratch = vec![0.0; params.len()];
        for p in 0..params.len() {
            let h = 1e-6 * params[p].abs().max(1.0);
            let mut plus = params.to_vec();
            plus[p] += h;
            let mut minus = params.to_vec();
            minus[p] -= h;
            let fp = eval_model(model, &plus, coord, region, &mut scratch);
            let fm = eval_model(model, &minus, coord, region, &mut scratch);
            grad.push((fp - fm) / (2.0 * h));
        }
        grad
    }

    #[test]
    fn test_gaussian_value_and_derivatives() {
        let region = FitRegion::new(vec![0, 0], vec![12, 12]);
        // One peak: h=50, position (5.2, 6.8), widths (2.5, 3.5).
        let params = vec![50.0, 5.2, 6.8, 2.5, 3.5];
        let coord = [6.0f32, 6.0];
        let mut deriv = vec![0.0; 5];
        let y = eval_model(ShapeModel::Gaussian, &params, &coord, &region, &mut deriv);

        let expect = 50.0
            * (-FOUR_LN2 * (0.8f64).powi(2) / 6.25).exp()
            * (-FOUR_LN2 * (0.8f64).powi(2) / 12.25).exp();
        assert!((y - expect).abs() < 1e-9 * expect);

        let grad = numeric_gradient(ShapeModel::Gaussian, &params, &coord, &region);
        for p in 0..5 {
            let scale = grad[p].abs().max(1e-6);
            assert!(
                (deriv[p] - grad[p]).abs() < 1e-4 * scale,
                "param {}: analytic {} vs numeric {}",
                p,
                deriv[p],
                grad[p]
            );
        }
    }

    #[test]
    fn test_lorentzian_value_and_derivatives() {
        let region = FitRegion::new(vec![0], vec![20]);
        let params = vec![80.0, 9.3, 4.0];
        let coord = [11.0f32];
        let mut deriv = vec![0.0; 3];
        let y = eval_model(ShapeModel::Lorentzian, &params, &coord, &region, &mut deriv);

        let dx = 11.0 - 9.3f64;
        let expect = 80.0 * 16.0 / (16.0 + 4.0 * dx * dx);
        assert!((y - expect).abs() < 1e-9 * expect);

        let grad = numeric_gradient(ShapeModel::Lorentzian, &params, &coord, &region);
        for p in 0..3 {
            let scale = grad[p].abs().max(1e-6);
            assert!(
                (deriv[p] - grad[p]).abs() < 1e-4 * scale,
                "param {}: analytic {} vs numeric {}",
                p,
                deriv[p],
                grad[p]
            );
        }
    }

    #[test]
    fn test_multi_peak_sum_and_blocks() {
        let region = FitRegion::new(vec![0], vec![30]);
        let params = vec![10.0, 5.0, 2.0, 20.0, 20.0, 3.0];
        let coord = [6.0f32];
        let mut deriv = vec![0.0; 6];
        let y = eval_model(ShapeModel::Gaussian, &params, &coord, &region, &mut deriv);

        let mut d1 = vec![0.0; 3];
        let y1 = eval_model(ShapeModel::Gaussian, &params[..3], &coord, &region, &mut d1);
        let mut d2 = vec![0.0; 3];
        let y2 = eval_model(ShapeModel::Gaussian, &params[3..], &coord, &region, &mut d2);
        assert!((y - (y1 + y2)).abs() < 1e-12);
        for i in 0..3 {
            assert!((deriv[i] - d1[i]).abs() < 1e-12);
            assert!((deriv[3 + i] - d2[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_out_of_region_penalty() {
        let region = FitRegion::new(vec![0], vec![10]);
        // One cell outside is tolerated, two is repelled.
        let mut deriv = vec![0.0; 3];
        let near = vec![5.0, 10.0, 2.0];
        let y = eval_model(ShapeModel::Gaussian, &near, &[4.0f32], &region, &mut deriv);
        assert!(y < OUT_OF_REGION_PENALTY);

        let far = vec![5.0, 11.5, 2.0];
        let y = eval_model(ShapeModel::Gaussian, &far, &[4.0f32], &region, &mut deriv);
        assert_eq!(y, OUT_OF_REGION_PENALTY);
        assert!(deriv.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ShapeModel::Gaussian.to_string(), "Gaussian");
        assert_eq!(ShapeModel::Lorentzian.to_string(), "Lorentzian");
    }
}
