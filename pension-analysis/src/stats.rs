use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::{mean, population_std_dev, ratio};

/// Multiplicateur d'écart-type des bornes basse et haute.
pub const BOUND_SIGMA: f64 = 1.5;
/// Fenêtre de la prédiction de valeur suivante.
pub const PREDICTION_WINDOW: usize = 10;
/// Seuil de variation moyenne au-delà duquel la tendance n'est plus stable.
pub const TREND_CHANGE_THRESHOLD: f64 = 1000.0;
const MAX_VALUE: f64 = 999_999.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundCount {
    pub count: usize,
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Descriptive {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub standard_deviation: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub out_of_range: BoundCount,
    pub above_upper_bound: BoundCount,
    pub below_lower_bound: BoundCount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DigitDistribution {
    /// Chiffre → occurrences dans l'écriture décimale de chaque valeur.
    pub digit_frequency: BTreeMap<u8, u32>,
    pub even_count: usize,
    pub odd_count: usize,
    /// Valeurs paires / valeurs impaires. `None` sans valeur impaire.
    pub even_odd_ratio: Option<f64>,
    pub prime_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DigitPatterns {
    /// Paires de chiffres adjacents d'écart 1, cumulées sur toutes les valeurs.
    pub consecutive_digits: usize,
    /// Valeurs contenant au moins un chiffre répété.
    pub repeated_digits: usize,
    /// Au moins une valeur à chiffres strictement croissants.
    pub ascending_sequence: bool,
    /// Au moins une valeur à chiffres strictement décroissants.
    pub descending_sequence: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "HAUSSE"),
            Trend::Decreasing => write!(f, "BAISSE"),
            Trend::Stable => write!(f, "STABLE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextPrediction {
    pub next_value: u32,
    pub confidence: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberAnalysis {
    /// Dernière valeur de la série (0 si vide).
    pub input: f64,
    pub statistics: Descriptive,
    pub distribution: DigitDistribution,
    pub patterns: DigitPatterns,
    pub predictions: NextPrediction,
}

fn to_f64<T: Into<f64>>(value: T) -> f64 {
    value.into()
}

fn to_u64<T: Into<u64>>(value: T) -> u64 {
    value.into()
}

/// Statistiques descriptives d'une série numérique quelconque.
///
/// Les entrées non finies sont ignorées partout ; les ratios hors bornes
/// restent calculés sur la longueur d'origine de la série.
pub fn describe<T: Copy + Into<f64>>(values: &[T]) -> Descriptive {
    let n = values.len();
    let mut finite: Vec<f64> = values
        .iter()
        .map(|&v| to_f64(v))
        .filter(|v| v.is_finite())
        .collect();
    if finite.is_empty() {
        return Descriptive {
            count: n,
            ..Default::default()
        };
    }

    finite.sort_by(|a, b| a.total_cmp(b));
    let len = finite.len();

    let mean = mean(&finite);
    let median = if len % 2 == 0 {
        (finite[len / 2 - 1] + finite[len / 2]) / 2.0
    } else {
        finite[len / 2]
    };
    let mode = mode_of_sorted(&finite);
    let min = finite[0];
    let max = finite[len - 1];
    let standard_deviation = population_std_dev(&finite);

    let lower_bound = mean - standard_deviation * BOUND_SIGMA;
    let upper_bound = mean + standard_deviation * BOUND_SIGMA;

    let below = finite.iter().filter(|&&v| v < lower_bound).count();
    let above = finite.iter().filter(|&&v| v > upper_bound).count();

    Descriptive {
        count: n,
        mean,
        median,
        mode,
        min,
        max,
        range: max - min,
        standard_deviation,
        lower_bound,
        upper_bound,
        out_of_range: BoundCount {
            count: below + above,
            ratio: ratio(below + above, n),
        },
        above_upper_bound: BoundCount {
            count: above,
            ratio: ratio(above, n),
        },
        below_lower_bound: BoundCount {
            count: below,
            ratio: ratio(below, n),
        },
    }
}

/// Valeur la plus fréquente d'une série triée ; à égalité, la plus petite.
fn mode_of_sorted(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_run = 0usize;
    let mut run = 0usize;
    for (i, &v) in sorted.iter().enumerate() {
        if i > 0 && v == sorted[i - 1] {
            run += 1;
        } else {
            run = 1;
        }
        if run > best_run {
            best_run = run;
            best = v;
        }
    }
    best
}

/// Chiffres décimaux d'une valeur, sans zéros en tête.
pub fn decimal_digits(value: u64) -> Vec<u8> {
    value.to_string().bytes().map(|b| b - b'0').collect()
}

pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3u64;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

pub fn digit_distribution<T: Copy + Into<u64>>(values: &[T]) -> DigitDistribution {
    let mut digit_frequency: BTreeMap<u8, u32> = BTreeMap::new();
    let mut even_count = 0usize;
    let mut prime_count = 0usize;

    for &v in values {
        let v = to_u64(v);
        for d in decimal_digits(v) {
            *digit_frequency.entry(d).or_insert(0) += 1;
        }
        if v % 2 == 0 {
            even_count += 1;
        }
        if is_prime(v) {
            prime_count += 1;
        }
    }

    let odd_count = values.len() - even_count;
    let even_odd_ratio = if odd_count > 0 {
        Some(even_count as f64 / odd_count as f64)
    } else {
        None
    };

    DigitDistribution {
        digit_frequency,
        even_count,
        odd_count,
        even_odd_ratio,
        prime_count,
    }
}

pub fn digit_patterns<T: Copy + Into<u64>>(values: &[T]) -> DigitPatterns {
    let mut patterns = DigitPatterns::default();

    for &v in values {
        let digits = decimal_digits(to_u64(v));

        patterns.consecutive_digits += digits
            .windows(2)
            .filter(|w| w[0].abs_diff(w[1]) == 1)
            .count();

        let mut seen = [false; 10];
        if digits.iter().any(|&d| std::mem::replace(&mut seen[d as usize], true)) {
            patterns.repeated_digits += 1;
        }

        if digits.windows(2).all(|w| w[0] < w[1]) {
            patterns.ascending_sequence = true;
        }
        if digits.windows(2).all(|w| w[0] > w[1]) {
            patterns.descending_sequence = true;
        }
    }

    patterns
}

/// Extrapolation naïve de la valeur suivante à partir des 10 dernières valeurs.
pub fn predict_next<T: Copy + Into<f64>, R: Rng + ?Sized>(
    values: &[T],
    rng: &mut R,
) -> NextPrediction {
    if values.len() < 2 {
        return NextPrediction {
            next_value: rng.random_range(0..MAX_VALUE as u32),
            confidence: 0.1,
            trend: Trend::Stable,
        };
    }

    let start = values.len().saturating_sub(PREDICTION_WINDOW);
    let recent: Vec<f64> = values[start..].iter().map(|&v| to_f64(v)).collect();
    let changes: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();

    let avg_change = mean(&changes);
    let last = recent[recent.len() - 1];

    let trend = if avg_change > TREND_CHANGE_THRESHOLD {
        Trend::Increasing
    } else if avg_change < -TREND_CHANGE_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    };

    let next_value = (last + avg_change).round().clamp(0.0, MAX_VALUE) as u32;

    let variance = changes
        .iter()
        .map(|c| (c - avg_change).powi(2))
        .sum::<f64>()
        / changes.len() as f64;
    let confidence = (1.0 - variance / 1_000_000.0).clamp(0.1, 0.9);

    NextPrediction {
        next_value,
        confidence,
        trend,
    }
}

pub fn analyze_numbers<T, R>(values: &[T], rng: &mut R) -> NumberAnalysis
where
    T: Copy + Into<f64> + Into<u64>,
    R: Rng + ?Sized,
{
    NumberAnalysis {
        input: values.last().map(|&v| to_f64(v)).unwrap_or(0.0),
        statistics: describe(values),
        distribution: digit_distribution(values),
        patterns: digit_patterns(values),
        predictions: predict_next(values, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_describe_basic() {
        let stats = describe(&[1u32, 2, 2, 3, 7]);
        assert!((stats.mean - 3.0).abs() < 1e-10);
        assert_eq!(stats.median, 2.0);
        assert_eq!(stats.mode, 2.0);
        assert_eq!(stats.range, 6.0);
        let expected_sd = ((4.0 + 1.0 + 1.0 + 0.0 + 16.0) / 5.0f64).sqrt();
        assert!((stats.standard_deviation - expected_sd).abs() < 1e-10);
    }

    #[test]
    fn test_describe_even_median() {
        let stats = describe(&[4u32, 1, 3, 2]);
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_describe_mode_tie_is_smallest() {
        let stats = describe(&[5u32, 9, 9, 5, 1]);
        assert_eq!(stats.mode, 5.0);
        // Déterministe d'un appel à l'autre
        assert_eq!(describe(&[5u32, 9, 9, 5, 1]), stats);
    }

    #[test]
    fn test_describe_bounds_invariants() {
        let values: Vec<u32> = (0..200).map(|i| (i * 7919 % 1000) as u32).chain([50_000, 90_000]).collect();
        let stats = describe(&values);
        assert!(stats.lower_bound <= stats.mean && stats.mean <= stats.upper_bound);
        assert!(stats.standard_deviation >= 0.0);
        assert!(stats.range >= 0.0);
        assert_eq!(
            stats.out_of_range.count,
            stats.above_upper_bound.count + stats.below_lower_bound.count
        );
        assert!(stats.above_upper_bound.count >= 2);
        assert!((stats.above_upper_bound.ratio - stats.above_upper_bound.count as f64 / 202.0).abs() < 1e-12);
    }

    #[test]
    fn test_describe_skips_non_finite_keeps_denominator() {
        let stats = describe(&[1.0f64, 1.0, 1.0, 100.0, f64::NAN]);
        assert_eq!(stats.count, 5);
        assert!(stats.mean.is_finite());
        assert_eq!(stats.above_upper_bound.count, 1);
        assert!((stats.above_upper_bound.ratio - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_describe_empty_is_zeroed() {
        let stats = describe::<u32>(&[]);
        assert_eq!(stats, Descriptive::default());
    }

    #[test]
    fn test_is_prime() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(is_prime(999_983));
        assert!(!is_prime(999_981));
    }

    #[test]
    fn test_digit_distribution() {
        let dist = digit_distribution(&[94678u32, 2, 13]);
        assert_eq!(dist.digit_frequency.get(&9), Some(&1));
        assert_eq!(dist.digit_frequency.get(&0), None);
        assert_eq!(dist.digit_frequency.values().sum::<u32>(), 5 + 1 + 2);
        assert_eq!(dist.even_count, 2);
        assert_eq!(dist.odd_count, 1);
        assert_eq!(dist.even_odd_ratio, Some(2.0));
        assert_eq!(dist.prime_count, 2);
    }

    #[test]
    fn test_even_odd_ratio_without_odd() {
        let dist = digit_distribution(&[2u32, 4, 6]);
        assert_eq!(dist.even_odd_ratio, None);
    }

    #[test]
    fn test_digit_patterns() {
        let patterns = digit_patterns(&[123456u32, 654321, 112233]);
        // 5 + 5 + 2
        assert_eq!(patterns.consecutive_digits, 12);
        assert_eq!(patterns.repeated_digits, 1);
        assert!(patterns.ascending_sequence);
        assert!(patterns.descending_sequence);

        let patterns = digit_patterns(&[121212u32]);
        assert!(!patterns.ascending_sequence);
        assert!(!patterns.descending_sequence);
    }

    #[test]
    fn test_predict_next_trend() {
        let mut rng = StdRng::seed_from_u64(1);
        let values: Vec<u32> = (0..15).map(|i| 100_000 + i * 5_000).collect();
        let pred = predict_next(&values, &mut rng);
        assert_eq!(pred.trend, Trend::Increasing);
        assert_eq!(pred.next_value, 100_000 + 15 * 5_000);
        // Variations constantes : variance nulle
        assert!((pred.confidence - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_predict_next_clamped() {
        let mut rng = StdRng::seed_from_u64(1);
        let pred = predict_next(&[999_000u32, 999_900], &mut rng);
        assert_eq!(pred.next_value, 999_999);
        let pred = predict_next(&[500_000u32, 100_000], &mut rng);
        assert_eq!(pred.next_value, 0);
        assert_eq!(pred.trend, Trend::Decreasing);
        assert!((pred.confidence - 0.9).abs() < 1e-12);

        let pred = predict_next(&[10u32, 500_000, 10], &mut rng);
        assert!((pred.confidence - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_predict_next_short_input() {
        let mut rng = StdRng::seed_from_u64(5);
        let pred = predict_next(&[42u32], &mut rng);
        assert!(pred.next_value < 999_999);
        assert_eq!(pred.confidence, 0.1);
        assert_eq!(pred.trend, Trend::Stable);
    }

    #[test]
    fn test_analyze_numbers_idempotent() {
        let values: Vec<u32> = vec![94678, 123456, 5, 777777, 10203];
        let a = analyze_numbers(&values, &mut StdRng::seed_from_u64(1));
        let b = analyze_numbers(&values, &mut StdRng::seed_from_u64(2));
        assert_eq!(a.statistics, b.statistics);
        assert_eq!(a.distribution, b.distribution);
        assert_eq!(a.patterns, b.patterns);
        assert_eq!(a.predictions, b.predictions);
        assert_eq!(a.input, 10203.0);
    }
}
