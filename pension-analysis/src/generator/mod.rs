//! Générateur heuristique de tirages.
//!
//! Les tirages réels sont indépendants et uniformes : ce générateur ne prédit
//! rien. Il reproduit des caractéristiques de l'historique (fréquences par
//! position, somme des chiffres, motifs de doublons, transitions, écart avec le
//! tirage précédent).

pub mod correction;

use rand::seq::index;
use rand::Rng;
use serde::Serialize;

use pension_db::models::{latest, DrawRecord, DIGIT_COUNT};

use crate::config::GeneratorConfig;
use crate::digit_sum::{analyze_digit_sums, DigitSumAnalysis};
use crate::duplicates::{analyze_duplicates, DuplicateAnalysis, OCCURRENCE_LEVELS};
use crate::positional::{analyze_position_frequency, PositionFrequency};
use crate::sampling::{uniform_choice, uniform_digits, weighted_choice};
use crate::transition::{
    analyze_position_transitions, compare_rounds_with, RoundComparison, TransitionAnalysis,
};

pub use correction::{correct_delta, correct_sum, DeltaCorrection, SumCorrection};

/// Chemin de construction emprunté par un tirage généré.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Branch {
    /// Aucun historique : 6 chiffres uniformes.
    Uniform,
    /// Motif O/X historique d'un seul doublon.
    Pattern,
    /// Six chiffres distincts.
    Distinct,
    /// Un chiffre répété `intensity` fois à des positions aléatoires.
    Intensity,
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Branch::Uniform => write!(f, "uniforme"),
            Branch::Pattern => write!(f, "motif"),
            Branch::Distinct => write!(f, "distincts"),
            Branch::Intensity => write!(f, "intensité"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generated {
    pub digits: [u8; DIGIT_COUNT],
    pub target_sum: u32,
    /// Intensité de répétition visée (0, 2, 3, 4, 5 ou 6).
    pub intensity: u8,
    pub branch: Branch,
    pub sum: SumCorrection,
    pub delta: DeltaCorrection,
}

/// Analyses de l'historique nécessaires au générateur, calculées une fois.
#[derive(Debug, Clone)]
pub struct GeneratorContext {
    pub positions: [PositionFrequency; DIGIT_COUNT],
    pub sums: DigitSumAnalysis,
    pub duplicates: DuplicateAnalysis,
    pub comparison: RoundComparison,
    pub transitions: TransitionAnalysis,
    /// Tirage au numéro le plus élevé.
    pub previous: Option<DrawRecord>,
    pub target_sum: u32,
}

impl GeneratorContext {
    pub fn from_records(records: &[DrawRecord], config: &GeneratorConfig) -> Self {
        let sums = analyze_digit_sums(records);
        let target_sum = sums.target_sum();
        Self {
            positions: analyze_position_frequency(records),
            duplicates: analyze_duplicates(records),
            comparison: compare_rounds_with(records, config.band_sigma),
            transitions: analyze_position_transitions(records),
            previous: latest(records).cloned(),
            target_sum,
            sums,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_none()
    }

    /// Poids d'un chiffre à une position : fréquence lissée, renforcée par la
    /// probabilité de transition depuis le chiffre du tirage précédent.
    pub fn digit_weight(&self, position: usize, digit: u8, boost: f64) -> f64 {
        let freq = self.positions[position].count(digit) as f64;
        let transition = self
            .previous
            .as_ref()
            .map(|prev| {
                self.transitions
                    .probability(position, prev.digits[position], digit)
            })
            .unwrap_or(0.0);
        (freq + 1.0) * (1.0 + transition * boost)
    }

    fn pick_digit<R: Rng + ?Sized>(
        &self,
        position: usize,
        allowed: impl Fn(u8) -> bool,
        boost: f64,
        rng: &mut R,
    ) -> u8 {
        let candidates: Vec<(u8, f64)> = (0..10u8)
            .filter(|&d| allowed(d))
            .map(|d| (d, self.digit_weight(position, d, boost)))
            .collect();
        weighted_choice(&candidates, rng).unwrap_or_else(|| rng.random_range(0..10u8))
    }

    /// Intensité de répétition tirée selon sa fréquence historique.
    pub(crate) fn pick_intensity<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        let candidates: Vec<(u8, f64)> = OCCURRENCE_LEVELS
            .iter()
            .map(|&level| (level, self.duplicates.level_count(level) as f64))
            .collect();
        weighted_choice(&candidates, rng).unwrap_or(0)
    }

    /// Branche « motif » : `None` si aucun motif historique.
    pub(crate) fn fill_pattern<R: Rng + ?Sized>(
        &self,
        boost: f64,
        rng: &mut R,
    ) -> Option<[u8; DIGIT_COUNT]> {
        let patterns: Vec<(String, f64)> = self
            .duplicates
            .patterns
            .iter()
            .map(|p| (p.pattern.clone(), p.count as f64))
            .collect();
        let pattern = weighted_choice(&patterns, rng)?;

        let ranking: Vec<(u8, f64)> = (0..10u8)
            .map(|d| (d, self.duplicates.ranking_count(d) as f64))
            .collect();
        let duplicate = weighted_choice(&ranking, rng).unwrap_or(0);

        let mut digits = [0u8; DIGIT_COUNT];
        for (pos, mark) in pattern.chars().take(DIGIT_COUNT).enumerate() {
            digits[pos] = if mark == 'O' {
                duplicate
            } else {
                self.pick_digit(pos, |d| d != duplicate, boost, rng)
            };
        }
        log::debug!("Motif {} avec le chiffre {}", pattern, duplicate);
        Some(digits)
    }

    /// Six chiffres tous différents, de gauche à droite.
    pub(crate) fn fill_distinct<R: Rng + ?Sized>(
        &self,
        boost: f64,
        rng: &mut R,
    ) -> [u8; DIGIT_COUNT] {
        let mut used = [false; 10];
        let mut digits = [0u8; DIGIT_COUNT];
        for (pos, slot) in digits.iter_mut().enumerate() {
            let digit = self.pick_digit(pos, |d| !used[d as usize], boost, rng);
            let digit = if used[digit as usize] {
                let unused: Vec<u8> = (0..10u8).filter(|&d| !used[d as usize]).collect();
                uniform_choice(&unused, rng).unwrap_or(digit)
            } else {
                digit
            };
            used[digit as usize] = true;
            *slot = digit;
        }
        digits
    }

    /// Un chiffre (pondéré par la fréquence en position 1) placé à
    /// `intensity` positions tirées au hasard ; les autres positions l'excluent.
    pub(crate) fn fill_intensity<R: Rng + ?Sized>(
        &self,
        intensity: u8,
        boost: f64,
        rng: &mut R,
    ) -> [u8; DIGIT_COUNT] {
        let first: Vec<(u8, f64)> = (0..10u8)
            .map(|d| (d, self.positions[0].count(d) as f64))
            .collect();
        let duplicate = weighted_choice(&first, rng).unwrap_or(0);

        let amount = (intensity as usize).min(DIGIT_COUNT);
        let mut marked = [false; DIGIT_COUNT];
        for pos in index::sample(rng, DIGIT_COUNT, amount) {
            marked[pos] = true;
        }

        let mut digits = [0u8; DIGIT_COUNT];
        for pos in 0..DIGIT_COUNT {
            digits[pos] = if marked[pos] {
                duplicate
            } else {
                self.pick_digit(pos, |d| d != duplicate, boost, rng)
            };
        }
        log::debug!("Chiffre {} répété {} fois", duplicate, amount);
        digits
    }
}

/// Génère un tirage à partir de l'historique complet.
pub fn generate_prediction<R: Rng + ?Sized>(
    records: &[DrawRecord],
    config: &GeneratorConfig,
    rng: &mut R,
) -> Generated {
    let context = GeneratorContext::from_records(records, config);
    generate_with_context(&context, config, rng)
}

/// Génère `count` tirages en partageant les analyses de l'historique.
pub fn generate_predictions<R: Rng + ?Sized>(
    records: &[DrawRecord],
    config: &GeneratorConfig,
    count: usize,
    rng: &mut R,
) -> Vec<Generated> {
    let context = GeneratorContext::from_records(records, config);
    (0..count)
        .map(|_| generate_with_context(&context, config, rng))
        .collect()
}

pub fn generate_with_context<R: Rng + ?Sized>(
    context: &GeneratorContext,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Generated {
    if context.is_empty() {
        log::debug!("Historique vide : tirage uniforme");
        return Generated {
            digits: uniform_digits(rng),
            target_sum: 0,
            intensity: 0,
            branch: Branch::Uniform,
            sum: SumCorrection::default(),
            delta: DeltaCorrection::NotNeeded,
        };
    }

    let boost = config.transition_boost;
    let intensity = context.pick_intensity(rng);
    log::debug!(
        "Somme cible {}, intensité {}",
        context.target_sum,
        intensity
    );

    let use_pattern =
        intensity == 2 && rng.random::<f64>() < config.pattern_probability;
    let pattern = if use_pattern {
        context.fill_pattern(boost, rng)
    } else {
        None
    };

    let (digits, branch) = match pattern {
        Some(digits) => (digits, Branch::Pattern),
        None if intensity == 0 => (context.fill_distinct(boost, rng), Branch::Distinct),
        None => (
            context.fill_intensity(intensity, boost, rng),
            Branch::Intensity,
        ),
    };

    let (digits, sum) = correct_sum(digits, context.target_sum, config, rng);
    let (digits, delta) = correct_delta(digits, context, config, rng);

    Generated {
        digits,
        target_sum: context.target_sum,
        intensity,
        branch,
        sum,
        delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::{classify, DuplicateClass};
    use crate::sampling::testing::ConstantRng;
    use pension_db::models::make_test_records;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(round_id: u32, digits: [u8; 6]) -> DrawRecord {
        DrawRecord {
            round_id,
            group_id: 1,
            digits,
            bonus_digits: [0; 6],
        }
    }

    fn single_pair_records() -> Vec<DrawRecord> {
        (1..=30)
            .map(|i| {
                let d = (i % 10) as u8;
                record(i, [d, d, (d + 1) % 10, (d + 2) % 10, (d + 3) % 10, (d + 4) % 10])
            })
            .collect()
    }

    fn distinct_records() -> Vec<DrawRecord> {
        (1..=30)
            .map(|i| {
                let d = (i % 10) as u8;
                record(i, std::array::from_fn(|k| (d + k as u8) % 10))
            })
            .collect()
    }

    #[test]
    fn test_empty_history_uniform() {
        let mut rng = StdRng::seed_from_u64(1);
        let generated = generate_prediction(&[], &GeneratorConfig::default(), &mut rng);
        assert_eq!(generated.branch, Branch::Uniform);
        assert!(generated.digits.iter().all(|&d| d <= 9));
    }

    #[test]
    fn test_digits_always_valid() {
        let records = make_test_records(80);
        let config = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        for generated in generate_predictions(&records, &config, 200, &mut rng) {
            assert!(generated.digits.iter().all(|&d| d <= 9));
            assert!(generated.sum.attempts <= config.max_sum_attempts);
            assert!(OCCURRENCE_LEVELS.contains(&generated.intensity));
        }
    }

    #[test]
    fn test_sum_mostly_within_tolerance() {
        let records = make_test_records(80);
        let config = GeneratorConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let context = GeneratorContext::from_records(&records, &config);
        let mut within = 0;
        for _ in 0..200 {
            let (digits, _) = correct_sum(
                context.fill_distinct(config.transition_boost, &mut rng),
                context.target_sum,
                &config,
                &mut rng,
            );
            let sum: u32 = digits.iter().map(|&d| d as u32).sum();
            if sum.abs_diff(context.target_sum) <= config.sum_tolerance {
                within += 1;
            }
        }
        assert!(within >= 195, "{} / 200 dans la tolérance", within);
    }

    #[test]
    fn test_constant_rng_terminates() {
        let records = make_test_records(50);
        let config = GeneratorConfig::default();
        for value in [0u64, u64::MAX, 0x5555_5555_5555_5555] {
            let mut rng = ConstantRng(value);
            let generated = generate_prediction(&records, &config, &mut rng);
            assert!(generated.digits.iter().all(|&d| d <= 9));
            assert!(generated.sum.attempts <= config.max_sum_attempts);
        }
    }

    #[test]
    fn test_pattern_branch() {
        let records = single_pair_records();
        let config = GeneratorConfig {
            pattern_probability: 1.0,
            ..GeneratorConfig::default()
        };
        let context = GeneratorContext::from_records(&records, &config);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let generated = generate_with_context(&context, &config, &mut rng);
            assert_eq!(generated.intensity, 2);
            assert_eq!(generated.branch, Branch::Pattern);
        }

        // Avant correction : le chiffre doublé occupe exactement les positions O
        for _ in 0..50 {
            let digits = context.fill_pattern(5.0, &mut rng).unwrap();
            assert_eq!(digits[0], digits[1]);
            assert!(digits[2..].iter().all(|&d| d != digits[0]));
        }
    }

    #[test]
    fn test_intensity_branch_without_pattern() {
        let records = single_pair_records();
        let config = GeneratorConfig {
            pattern_probability: 0.0,
            ..GeneratorConfig::default()
        };
        let context = GeneratorContext::from_records(&records, &config);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            assert_eq!(
                generate_with_context(&context, &config, &mut rng).branch,
                Branch::Intensity
            );
        }

        for intensity in [2u8, 3, 6] {
            let digits = context.fill_intensity(intensity, 5.0, &mut rng);
            let max = crate::duplicates::digit_counts(&digits)
                .into_iter()
                .max()
                .unwrap();
            assert!(max >= intensity);
        }
    }

    #[test]
    fn test_distinct_branch() {
        let records = distinct_records();
        let config = GeneratorConfig::default();
        let context = GeneratorContext::from_records(&records, &config);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..20 {
            let generated = generate_with_context(&context, &config, &mut rng);
            assert_eq!(generated.intensity, 0);
            assert_eq!(generated.branch, Branch::Distinct);
        }
        for _ in 0..50 {
            let digits = context.fill_distinct(5.0, &mut rng);
            assert_eq!(classify(&digits), DuplicateClass::NoDuplicate);
        }
    }

    #[test]
    fn test_transition_boost_weight() {
        // Position 1 : 3 est toujours suivi de 7
        let records = vec![
            record(1, [3, 0, 0, 0, 0, 0]),
            record(2, [7, 0, 0, 0, 0, 0]),
            record(3, [3, 0, 0, 0, 0, 0]),
        ];
        let context = GeneratorContext::from_records(&records, &GeneratorConfig::default());
        assert_eq!(context.previous.as_ref().unwrap().round_id, 3);
        // fréquence 1, transition 3→7 = 1 : (1 + 1) * (1 + 5)
        assert!((context.digit_weight(0, 7, 5.0) - 12.0).abs() < 1e-12);
        // fréquence 2, aucune transition 3→3
        assert!((context.digit_weight(0, 3, 5.0) - 3.0).abs() < 1e-12);
        assert!((context.digit_weight(0, 5, 5.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seed_reproducible() {
        let records = make_test_records(40);
        let config = GeneratorConfig::default();
        let a = generate_predictions(&records, &config, 5, &mut StdRng::seed_from_u64(9));
        let b = generate_predictions(&records, &config, 5, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
