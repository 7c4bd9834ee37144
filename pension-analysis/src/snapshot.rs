use std::path::Path;

use anyhow::Context;
use rand::Rng;
use serde::Serialize;

use pension_db::models::{extract_numbers, frequency_set, DrawRecord, DIGIT_COUNT};

use crate::digit_sum::{analyze_digit_sums, DigitSumAnalysis};
use crate::duplicates::{analyze_duplicates, DuplicateAnalysis};
use crate::positional::{analyze_position_frequency, PositionFrequency};
use crate::stats::{analyze_numbers, NumberAnalysis};
use crate::summary::{summarize, DataSummary};
use crate::transition::{
    analyze_position_transitions, compare_rounds_with, RoundComparison, TransitionAnalysis,
    DEFAULT_BAND_SIGMA,
};
use crate::trend::{trend_series, TrendSeries};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotOptions {
    /// Les chiffres bonus comptent comme des tirages supplémentaires pour les
    /// analyses de fréquence et la série de valeurs.
    pub include_bonus: bool,
    pub band_sigma: f64,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            include_bonus: false,
            band_sigma: DEFAULT_BAND_SIGMA,
        }
    }
}

/// Toutes les analyses d'une collection, recalculées d'un bloc.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSnapshot {
    pub record_count: usize,
    pub include_bonus: bool,
    pub numbers: NumberAnalysis,
    pub summary: DataSummary,
    pub positions: [PositionFrequency; DIGIT_COUNT],
    pub duplicates: DuplicateAnalysis,
    pub digit_sums: DigitSumAnalysis,
    pub comparison: RoundComparison,
    pub transitions: TransitionAnalysis,
    pub trend: TrendSeries,
}

impl AnalysisSnapshot {
    pub fn compute<R: Rng + ?Sized>(
        records: &[DrawRecord],
        options: SnapshotOptions,
        rng: &mut R,
    ) -> Self {
        let frequency = frequency_set(records, options.include_bonus);

        // La série de valeurs part du plus ancien tirage
        let mut numbers = extract_numbers(records, options.include_bonus);
        numbers.reverse();

        log::debug!(
            "Instantané : {} tirages, {} valeurs",
            records.len(),
            numbers.len()
        );

        Self {
            record_count: records.len(),
            include_bonus: options.include_bonus,
            numbers: analyze_numbers(&numbers, rng),
            summary: summarize(records),
            positions: analyze_position_frequency(&frequency),
            duplicates: analyze_duplicates(&frequency),
            digit_sums: analyze_digit_sums(&frequency),
            comparison: compare_rounds_with(records, options.band_sigma),
            transitions: analyze_position_transitions(records),
            trend: trend_series(records),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Impossible d'écrire l'instantané {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pension_db::models::make_test_records;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_compute() {
        let records = make_test_records(30);
        let mut rng = StdRng::seed_from_u64(1);
        let snapshot = AnalysisSnapshot::compute(&records, SnapshotOptions::default(), &mut rng);

        assert_eq!(snapshot.record_count, 30);
        assert_eq!(snapshot.numbers.statistics.count, 30);
        assert_eq!(snapshot.positions[0].total, 30);
        assert_eq!(snapshot.duplicates.total_records, 30);
        assert_eq!(snapshot.comparison.total_comparisons, 29);
        assert_eq!(snapshot.transitions.total_transitions, 29);
        assert_eq!(snapshot.trend.points.len(), 30);
        // Dernière valeur de la série = tirage le plus récent
        assert_eq!(snapshot.numbers.input, records[0].combined_value() as f64);
    }

    #[test]
    fn test_bonus_only_in_frequency_views() {
        let records = make_test_records(10);
        let mut rng = StdRng::seed_from_u64(2);
        let options = SnapshotOptions {
            include_bonus: true,
            ..SnapshotOptions::default()
        };
        let snapshot = AnalysisSnapshot::compute(&records, options, &mut rng);

        assert_eq!(snapshot.numbers.statistics.count, 20);
        assert_eq!(snapshot.positions[0].total, 20);
        assert_eq!(snapshot.digit_sums.total, 20);
        assert_eq!(snapshot.comparison.total_comparisons, 9);
        assert_eq!(snapshot.summary.total_count, 10);
    }

    #[test]
    fn test_deterministic_parts_stable() {
        let records = make_test_records(25);
        let a = AnalysisSnapshot::compute(
            &records,
            SnapshotOptions::default(),
            &mut StdRng::seed_from_u64(3),
        );
        let b = AnalysisSnapshot::compute(
            &records,
            SnapshotOptions::default(),
            &mut StdRng::seed_from_u64(4),
        );
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.duplicates, b.duplicates);
        assert_eq!(a.comparison, b.comparison);
        assert_eq!(a.transitions, b.transitions);
        assert_eq!(a.trend, b.trend);
    }

    #[test]
    fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let mut rng = StdRng::seed_from_u64(5);
        let snapshot =
            AnalysisSnapshot::compute(&make_test_records(5), SnapshotOptions::default(), &mut rng);
        snapshot.save(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["record_count"], 5);
        assert!(value["duplicates"]["buckets"].is_array());
    }

    #[test]
    fn test_empty() {
        let mut rng = StdRng::seed_from_u64(6);
        let snapshot = AnalysisSnapshot::compute(&[], SnapshotOptions::default(), &mut rng);
        assert_eq!(snapshot.record_count, 0);
        assert_eq!(snapshot.summary.total_count, 0);
        assert!(snapshot.trend.points.is_empty());
    }
}
