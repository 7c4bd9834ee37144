use serde::Serialize;

use pension_db::models::{DrawRecord, DIGIT_COUNT};

use crate::ratio;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DigitShare {
    pub digit: u8,
    pub count: u32,
    /// count / (total × 6)
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataSummary {
    pub total_count: usize,
    pub min_value: u32,
    pub max_value: u32,
    pub average_value: f64,
    pub digit_distribution: Vec<DigitShare>,
    pub even_count: usize,
    pub odd_count: usize,
    pub even_odd_ratio: Option<f64>,
}

/// Vue d'ensemble de la collection chargée.
pub fn summarize(records: &[DrawRecord]) -> DataSummary {
    if records.is_empty() {
        return DataSummary::default();
    }

    let values: Vec<u32> = records.iter().map(|r| r.combined_value()).collect();
    let total_count = values.len();

    let mut counts = [0u32; 10];
    for record in records {
        for &d in &record.digits {
            counts[d as usize] += 1;
        }
    }
    let digit_distribution = (0..10u8)
        .map(|d| DigitShare {
            digit: d,
            count: counts[d as usize],
            share: ratio(counts[d as usize] as usize, total_count * DIGIT_COUNT),
        })
        .collect();

    let even_count = values.iter().filter(|&&v| v % 2 == 0).count();
    let odd_count = total_count - even_count;

    DataSummary {
        total_count,
        min_value: values.iter().copied().min().unwrap_or(0),
        max_value: values.iter().copied().max().unwrap_or(0),
        average_value: values.iter().map(|&v| v as f64).sum::<f64>() / total_count as f64,
        digit_distribution,
        even_count,
        odd_count,
        even_odd_ratio: if odd_count > 0 {
            Some(even_count as f64 / odd_count as f64)
        } else {
            None
        },
    }
}
