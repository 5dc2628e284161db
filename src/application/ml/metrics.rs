//! Binary classification metrics
//!
//! Computed from true labels and predicted probabilities, the way the
//! training report shows them: accuracy, AUC and F1, plus the supporting
//! confusion matrix and log-loss.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[bool], predicted: &[bool]) -> Self {
        let mut cm = Self::default();
        for (&actual, &pred) in labels.iter().zip(predicted.iter()) {
            match (actual, pred) {
                (true, true) => cm.true_positives += 1,
                (false, false) => cm.true_negatives += 1,
                (false, true) => cm.false_positives += 1,
                (true, false) => cm.false_negatives += 1,
            }
        }
        cm
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryClassificationMetrics {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Area under the ROC curve; `None` when only one class is present.
    pub auc: Option<f64>,
    pub log_loss: f64,
}

impl BinaryClassificationMetrics {
    pub fn evaluate(labels: &[bool], probabilities: &[f64], threshold: f64) -> Self {
        let n = labels.len().min(probabilities.len());
        if n == 0 {
            return Self::default();
        }
        let labels = &labels[..n];
        let probabilities = &probabilities[..n];

        let predicted: Vec<bool> = probabilities.iter().map(|&p| p >= threshold).collect();
        let confusion = ConfusionMatrix::from_predictions(labels, &predicted);

        let tp = confusion.true_positives as f64;
        let tn = confusion.true_negatives as f64;
        let fp = confusion.false_positives as f64;
        let fn_ = confusion.false_negatives as f64;

        let accuracy = (tp + tn) / n as f64;
        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            confusion,
            accuracy,
            precision,
            recall,
            f1_score,
            auc: roc_auc(labels, probabilities),
            log_loss: log_loss(labels, probabilities),
        }
    }
}

/// Mann-Whitney estimate of the ROC AUC, averaging ranks over ties.
pub fn roc_auc(labels: &[bool], probabilities: &[f64]) -> Option<f64> {
    let positives = labels.iter().filter(|&&l| l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[a].total_cmp(&probabilities[b]));

    let mut positive_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && probabilities[order[j + 1]] == probabilities[order[i]] {
            j += 1;
        }
        // Ranks are 1-based; tied scores share the mean rank.
        let mean_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if labels[idx] {
                positive_rank_sum += mean_rank;
            }
        }
        i = j + 1;
    }

    let p = positives as f64;
    let q = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * q))
}

pub fn log_loss(labels: &[bool], probabilities: &[f64]) -> f64 {
    let eps = 1e-15;
    let n = labels.len().min(probabilities.len());
    if n == 0 {
        return 0.0;
    }
    let total: f64 = labels
        .iter()
        .zip(probabilities.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            if y { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking() {
        let labels = [false, false, true, true];
        let probs = [0.1, 0.3, 0.7, 0.9];
        let m = BinaryClassificationMetrics::evaluate(&labels, &probs, 0.5);

        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.f1_score, 1.0);
        assert_eq!(m.auc, Some(1.0));
        assert_eq!(m.confusion.total(), 4);
    }

    #[test]
    fn test_inverted_ranking() {
        let labels = [true, true, false, false];
        let probs = [0.1, 0.3, 0.7, 0.9];
        let m = BinaryClassificationMetrics::evaluate(&labels, &probs, 0.5);

        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.f1_score, 0.0);
        assert_eq!(m.auc, Some(0.0));
    }

    #[test]
    fn test_ties_average_to_half() {
        let labels = [true, false, true, false];
        let probs = [0.5, 0.5, 0.5, 0.5];
        assert_eq!(roc_auc(&labels, &probs), Some(0.5));
    }

    #[test]
    fn test_single_class_has_no_auc() {
        let labels = [true, true];
        let probs = [0.2, 0.8];
        let m = BinaryClassificationMetrics::evaluate(&labels, &probs, 0.5);
        assert_eq!(m.auc, None);
        assert_eq!(m.accuracy, 0.5);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 0.5);
    }

    #[test]
    fn test_confusion_matrix_counts() {
        let labels = [true, false, true, false, true];
        let predicted = [true, true, false, false, true];
        let cm = ConfusionMatrix::from_predictions(&labels, &predicted);
        assert_eq!(cm.true_positives, 2);
        assert_eq!(cm.false_positives, 1);
        assert_eq!(cm.false_negatives, 1);
        assert_eq!(cm.true_negatives, 1);
    }

    #[test]
    fn test_log_loss_is_clipped() {
        let loss = log_loss(&[true], &[0.0]);
        assert!(loss.is_finite());
        assert!((log_loss(&[true, false], &[0.5, 0.5]) - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input() {
        let m = BinaryClassificationMetrics::evaluate(&[], &[], 0.5);
        assert_eq!(m.confusion.total(), 0);
        assert_eq!(m.auc, None);
    }
}
