use serde::Serialize;

use pension_db::models::{combine_digits, digit_sum, DrawRecord, DIGIT_COUNT};

use crate::digit_sum::analyze_digit_sums;
use crate::duplicates::{
    analyze_duplicates, classify, digit_counts, duplicate_digits, position_pattern,
    DuplicateAnalysis, DuplicateClass,
};
use crate::positional::analyze_position_frequency;
use crate::ratio;

/// Lecture d'un tirage généré à la lumière de l'historique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub digits: [u8; DIGIT_COUNT],
    pub combined_value: u32,
    pub digit_sum: u32,
    pub avg_sum: f64,
    /// Somme du tirage moins la somme moyenne historique.
    pub sum_difference: f64,
    pub class: DuplicateClass,
    /// O/X (un chiffre répété), O/A/X (deux chiffres répétés), `None` sans doublon.
    pub pattern: Option<String>,
    /// Occurrences historiques du motif, ou de la classe si le motif est inconnu.
    pub pattern_count: u32,
    pub pattern_percentage: Option<f64>,
    /// Part des tirages où ce chiffre était l'unique doublon (%).
    pub duplicate_probability: Option<f64>,
    /// count(chiffre à la position) / N × 100.
    pub position_percentages: [f64; DIGIT_COUNT],
}

fn class_share(analysis: &DuplicateAnalysis, class: DuplicateClass) -> (u32, Option<f64>) {
    let bucket = analysis.bucket(class);
    let percentage = (bucket.ratio > 0.0).then_some(bucket.ratio * 100.0);
    (bucket.count, percentage)
}

/// Motif à deux chiffres répétés : O pour le premier, A pour le second.
fn two_digit_pattern(digits: &[u8; DIGIT_COUNT], first: u8, second: u8) -> String {
    digits
        .iter()
        .map(|&d| match d {
            d if d == first => 'O',
            d if d == second => 'A',
            _ => 'X',
        })
        .collect()
}

pub fn describe_prediction(digits: &[u8; DIGIT_COUNT], records: &[DrawRecord]) -> PredictionReport {
    let total = records.len();
    let duplicates = analyze_duplicates(records);
    let sums = analyze_digit_sums(records);
    let positions = analyze_position_frequency(records);

    let class = classify(digits);
    let counts = digit_counts(digits);
    let repeated = duplicate_digits(digits);

    let mut duplicate_probability = None;
    let (pattern, (pattern_count, pattern_percentage)) = match repeated.as_slice() {
        [] => (None, class_share(&duplicates, class)),
        [digit] => {
            let ranking = duplicates.ranking_count(*digit);
            if ranking > 0 {
                duplicate_probability = Some(ratio(ranking as usize, total) * 100.0);
            }
            let pattern = position_pattern(digits, *digit);
            let share = match duplicates.pattern(&pattern) {
                Some(detail) if counts[*digit as usize] == 2 => {
                    (detail.count, Some(detail.percentage))
                }
                _ => class_share(&duplicates, class),
            };
            (Some(pattern), share)
        }
        [first, second] => (
            Some(two_digit_pattern(digits, *first, *second)),
            class_share(&duplicates, class),
        ),
        _ => {
            let pattern: String = digits
                .iter()
                .map(|&d| if counts[d as usize] >= 2 { 'O' } else { 'X' })
                .collect();
            (Some(pattern), class_share(&duplicates, class))
        }
    };

    let position_percentages =
        std::array::from_fn(|pos| positions[pos].percentage(digits[pos]));

    let sum = digit_sum(digits);
    PredictionReport {
        digits: *digits,
        combined_value: combine_digits(digits),
        digit_sum: sum,
        avg_sum: sums.avg_sum,
        sum_difference: sum as f64 - sums.avg_sum,
        class,
        pattern,
        pattern_count,
        pattern_percentage,
        duplicate_probability,
        position_percentages,
    }
}
