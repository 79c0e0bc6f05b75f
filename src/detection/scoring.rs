use crate::detection::Anomaly;

/// Composite suspicion score in `0..=10`.
///
/// Averages the highest single score with the mean score and rounds half up.
/// An empty list scores 0.
pub fn composite_score(anomalies: &[Anomaly]) -> u8 {
    if anomalies.is_empty() {
        return 0;
    }

    let max_score = anomalies.iter().map(|a| a.score).max().unwrap_or(0) as f64;
    let average_score =
        anomalies.iter().map(|a| a.score as f64).sum::<f64>() / anomalies.len() as f64;

    let composite = ((max_score + average_score) / 2.0 + 0.5).floor();
    composite.clamp(0.0, 10.0) as u8
}

/// Fill percentage of a suspicion gauge for a composite score.
pub fn scale_fill_percent(composite: u8) -> u8 {
    composite.min(10) * 10
}
