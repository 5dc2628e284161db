//! L2-regularized logistic regression trained with stochastic dual
//! coordinate ascent (SDCA).
//!
//! Labels are mapped to `{-1, +1}` and every sample owns a dual variable
//! `alpha_i` with `alpha_i * y_i` in `[0, 1]`. The primal weights are kept
//! in sync as `w = sum(alpha_i * x_i) / (lambda * n)`; the bias is treated as
//! a constant feature of value 1. Training stops once the duality gap drops
//! below the tolerance or the epoch budget runs out.

use crate::domain::errors::ModelError;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SdcaParameters {
    pub l2_regularization: f64,
    pub max_epochs: usize,
    pub convergence_tolerance: f64,
    pub seed: u64,
}

impl Default for SdcaParameters {
    fn default() -> Self {
        Self {
            l2_regularization: 1e-3,
            max_epochs: 100,
            convergence_tolerance: 1e-4,
            seed: 42,
        }
    }
}

impl SdcaParameters {
    pub fn with_l2_regularization(mut self, l2: f64) -> Self {
        self.l2_regularization = l2;
        self
    }

    pub fn with_max_epochs(mut self, epochs: usize) -> Self {
        self.max_epochs = epochs;
        self
    }

    pub fn with_convergence_tolerance(mut self, tolerance: f64) -> Self {
        self.convergence_tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !(self.l2_regularization > 0.0 && self.l2_regularization.is_finite()) {
            return Err(ModelError::InvalidParameter {
                name: "l2_regularization",
                reason: format!("must be positive, got {}", self.l2_regularization),
            });
        }
        if self.max_epochs == 0 {
            return Err(ModelError::InvalidParameter {
                name: "max_epochs",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.convergence_tolerance > 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "convergence_tolerance",
                reason: format!("must be positive, got {}", self.convergence_tolerance),
            });
        }
        Ok(())
    }
}

/// Fitted linear classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    /// Raw margin `w.x + b`.
    pub fn score(&self, x: &[f64]) -> Result<f64, ModelError> {
        if x.len() != self.weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.weights.len(),
                got: x.len(),
            });
        }
        let dot: f64 = self.weights.iter().zip(x).map(|(w, v)| w * v).sum();
        Ok(dot + self.bias)
    }

    pub fn probability(score: f64) -> f64 {
        sigmoid(score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SdcaTrainingSummary {
    pub epochs: usize,
    pub duality_gap: f64,
    pub converged: bool,
}

pub struct SdcaLogisticRegression {
    params: SdcaParameters,
}

impl SdcaLogisticRegression {
    pub fn new(params: SdcaParameters) -> Self {
        Self { params }
    }

    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &[bool],
    ) -> Result<(LogisticModel, SdcaTrainingSummary), ModelError> {
        self.params.validate()?;

        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if y.len() != n_samples {
            return Err(ModelError::DimensionMismatch {
                expected: n_samples,
                got: y.len(),
            });
        }

        let positives = y.iter().filter(|&&l| l).count();
        if positives == 0 || positives == n_samples {
            warn!(
                "Training set has a single class ({} positive / {} samples)",
                positives, n_samples
            );
        }

        let lambda = self.params.l2_regularization;
        let lambda_n = lambda * n_samples as f64;
        let targets: Vec<f64> = y.iter().map(|&l| if l { 1.0 } else { -1.0 }).collect();
        // Squared norm of each row including the constant bias feature.
        let sq_norms: Vec<f64> = x.rows().into_iter().map(|r| r.dot(&r) + 1.0).collect();

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let mut alpha = vec![0.0; n_samples];
        let mut order: Vec<usize> = (0..n_samples).collect();
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let mut summary = SdcaTrainingSummary {
            epochs: 0,
            duality_gap: f64::INFINITY,
            converged: false,
        };

        for epoch in 1..=self.params.max_epochs {
            order.shuffle(&mut rng);

            for &i in &order {
                let row = x.row(i);
                let yi = targets[i];
                let margin = yi * (row.dot(&weights) + bias);
                let b_i = alpha[i] * yi;

                let step = (sigmoid(-margin) - b_i) / (0.25 + sq_norms[i] / lambda_n).max(1.0);
                let new_b = (b_i + step).clamp(0.0, 1.0);
                let delta = (new_b - b_i) * yi;

                if delta != 0.0 {
                    alpha[i] += delta;
                    weights.scaled_add(delta / lambda_n, &row);
                    bias += delta / lambda_n;
                }
            }

            let gap = duality_gap(x, &targets, &alpha, &weights, bias, lambda);
            debug!("SDCA epoch {}: duality gap {:.6e}", epoch, gap);

            summary.epochs = epoch;
            summary.duality_gap = gap;
            if gap <= self.params.convergence_tolerance {
                summary.converged = true;
                break;
            }
        }

        info!(
            "SDCA finished after {} epochs (gap {:.3e}, converged: {})",
            summary.epochs, summary.duality_gap, summary.converged
        );

        Ok((
            LogisticModel {
                weights: weights.to_vec(),
                bias,
            },
            summary,
        ))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn x_ln_x(v: f64) -> f64 {
    if v <= 0.0 { 0.0 } else { v * v.ln() }
}

fn duality_gap(
    x: &Array2<f64>,
    targets: &[f64],
    alpha: &[f64],
    weights: &Array1<f64>,
    bias: f64,
    lambda: f64,
) -> f64 {
    let n = targets.len() as f64;
    let regularizer = 0.5 * lambda * (weights.dot(weights) + bias * bias);

    let mut loss = 0.0;
    let mut entropy = 0.0;
    for (i, row) in x.rows().into_iter().enumerate() {
        let margin = targets[i] * (row.dot(weights) + bias);
        loss += softplus(-margin);

        let b = alpha[i] * targets[i];
        entropy -= x_ln_x(b) + x_ln_x(1.0 - b);
    }

    let primal = loss / n + regularizer;
    let dual = entropy / n - regularizer;
    primal - dual
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Array2<f64>, Vec<bool>) {
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                0.0, 0.1, 0.1, 0.0, 0.2, 0.2, 0.15, 0.05, //
                0.9, 1.0, 1.0, 0.8, 0.85, 0.9, 0.95, 0.95,
            ],
        )
        .unwrap();
        let y = vec![false, false, false, false, true, true, true, true];
        (x, y)
    }

    fn params() -> SdcaParameters {
        SdcaParameters::default()
            .with_l2_regularization(0.01)
            .with_max_epochs(300)
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(50.0) > 0.99);
        assert!(sigmoid(-50.0) < 0.01);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn test_softplus_matches_naive() {
        for z in [-5.0, -0.5, 0.0, 0.5, 5.0] {
            let naive = (1.0 + f64::exp(z)).ln();
            assert!((softplus(z) - naive).abs() < 1e-12);
        }
        assert!(softplus(1000.0).is_finite());
    }

    #[test]
    fn test_fit_separates_classes() {
        let (x, y) = separable();
        let trainer = SdcaLogisticRegression::new(params());
        let (model, summary) = trainer.fit(&x, &y).unwrap();

        assert!(summary.epochs >= 1);
        assert!(summary.duality_gap >= -1e-9);
        for (row, &label) in x.rows().into_iter().zip(y.iter()) {
            let score = model.score(row.as_slice().unwrap()).unwrap();
            assert_eq!(score > 0.0, label, "row {:?} scored {}", row, score);
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = separable();
        let trainer = SdcaLogisticRegression::new(params().with_max_epochs(5));
        let (a, _) = trainer.fit(&x, &y).unwrap();
        let (b, _) = trainer.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_training_set() {
        let x = Array2::<f64>::zeros((0, 3));
        let trainer = SdcaLogisticRegression::new(params());
        assert_eq!(
            trainer.fit(&x, &[]).unwrap_err(),
            ModelError::EmptyTrainingSet
        );
    }

    #[test]
    fn test_label_count_mismatch() {
        let (x, _) = separable();
        let trainer = SdcaLogisticRegression::new(params());
        assert!(matches!(
            trainer.fit(&x, &[true, false]),
            Err(ModelError::DimensionMismatch {
                expected: 8,
                got: 2
            })
        ));
    }

    #[test]
    fn test_invalid_regularization() {
        let (x, y) = separable();
        let trainer = SdcaLogisticRegression::new(params().with_l2_regularization(0.0));
        assert!(matches!(
            trainer.fit(&x, &y),
            Err(ModelError::InvalidParameter {
                name: "l2_regularization",
                ..
            })
        ));
    }

    #[test]
    fn test_score_dimension_check() {
        let model = LogisticModel {
            weights: vec![1.0, -1.0],
            bias: 0.5,
        };
        assert_eq!(model.score(&[2.0, 1.0]).unwrap(), 1.5);
        assert!(model.score(&[1.0]).is_err());
    }
}
