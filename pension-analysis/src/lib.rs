pub mod config;
pub mod digit_sum;
pub mod duplicates;
pub mod generator;
pub mod positional;
pub mod report;
pub mod retry;
pub mod sampling;
pub mod snapshot;
pub mod stats;
pub mod summary;
pub mod transition;
pub mod trend;

/// Ratio protégé : 0 quand le dénominateur est nul.
pub(crate) fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Écart-type de population (division par N).
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
