//! Console output for training runs and single predictions.

use super::metrics::BinaryClassificationMetrics;
use crate::domain::types::{FeatureVector, PredictionResult, TradeRecord};

/// Label distribution of a derived dataset.
pub fn format_dataset_summary(features: &[FeatureVector]) -> String {
    let n = features.len();
    let positives = features.iter().filter(|fv| fv.label).count();
    let pct = |count: usize| {
        if n == 0 {
            0.0
        } else {
            count as f64 / n as f64 * 100.0
        }
    };

    format!(
        "Target Distribution (result):\n  Total:    {}\n  Positive: {} ({:.1}%)\n  Negative: {} ({:.1}%)",
        n,
        positives,
        pct(positives),
        n - positives,
        pct(n - positives)
    )
}

pub fn format_metrics(metrics: &BinaryClassificationMetrics) -> String {
    let auc = metrics
        .auc
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "n/a (single class)".to_string());
    let cm = &metrics.confusion;

    let mut out = String::new();
    out.push_str("Model quality metrics evaluation\n");
    out.push_str(&format!("{}\n", "-".repeat(32)));
    out.push_str(&format!("Accuracy: {:.2}%\n", metrics.accuracy * 100.0));
    out.push_str(&format!("Auc: {}\n", auc));
    out.push_str(&format!("F1Score: {:.2}%\n", metrics.f1_score * 100.0));
    out.push_str(&format!(
        "Precision: {:.2}% | Recall: {:.2}% | LogLoss: {:.4}\n",
        metrics.precision * 100.0,
        metrics.recall * 100.0,
        metrics.log_loss
    ));
    out.push_str(&format!(
        "Confusion: TP={} FP={} TN={} FN={} (n={})",
        cm.true_positives,
        cm.false_positives,
        cm.true_negatives,
        cm.false_negatives,
        cm.total()
    ));
    out
}

pub fn format_prediction(result: &PredictionResult<TradeRecord>) -> String {
    format!(
        "Trade {} ({}) | Prediction: {} | Probability: {:.4} | Score: {:.4}",
        result.record.id,
        result.record.position,
        if result.predicted_label {
            "Positive"
        } else {
            "Negative"
        },
        result.probability,
        result.score
    )
}

pub fn print_metrics(metrics: &BinaryClassificationMetrics) {
    println!("\n{}", "=".repeat(60));
    println!("{}", format_metrics(metrics));
    println!("{}\n", "=".repeat(60));
}

pub fn print_prediction(result: &PredictionResult<TradeRecord>) {
    println!("\n{}", "=".repeat(60));
    println!("  SINGLE TRADE PREDICTION");
    println!("{}", "=".repeat(60));
    println!("{}", format_prediction(result));
    println!("{}\n", "=".repeat(60));
}
