use std::collections::HashMap;

use serde::Serialize;

use pension_db::models::{DrawRecord, DIGIT_COUNT};

use crate::ratio;

/// Nombre maximum de tirages d'exemple conservés par motif.
pub const MAX_PATTERN_EXAMPLES: usize = 5;
/// Niveaux d'intensité de répétition : occurrences du chiffre le plus répété
/// (0 = aucun chiffre répété).
pub const OCCURRENCE_LEVELS: [u8; 6] = [0, 2, 3, 4, 5, 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DuplicateClass {
    NoDuplicate,
    /// Un seul chiffre, présent exactement deux fois.
    SinglePair,
    /// Deux chiffres répétés (hors cas où les deux le sont 3 fois ou plus).
    TwoPairs,
    Other,
}

impl DuplicateClass {
    pub const ALL: [DuplicateClass; 4] = [
        DuplicateClass::NoDuplicate,
        DuplicateClass::SinglePair,
        DuplicateClass::TwoPairs,
        DuplicateClass::Other,
    ];

    /// Clé numérique historique : 0, 1, 2, et -1 pour « autre ».
    pub fn bucket_key(self) -> i8 {
        match self {
            DuplicateClass::NoDuplicate => 0,
            DuplicateClass::SinglePair => 1,
            DuplicateClass::TwoPairs => 2,
            DuplicateClass::Other => -1,
        }
    }
}

impl std::fmt::Display for DuplicateClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateClass::NoDuplicate => write!(f, "Aucun doublon"),
            DuplicateClass::SinglePair => write!(f, "1 doublon"),
            DuplicateClass::TwoPairs => write!(f, "2 doublons"),
            DuplicateClass::Other => write!(f, "Autre"),
        }
    }
}

pub fn digit_counts(digits: &[u8; DIGIT_COUNT]) -> [u8; 10] {
    let mut counts = [0u8; 10];
    for &d in digits {
        counts[d as usize] += 1;
    }
    counts
}

/// Chiffres présents au moins deux fois, par ordre croissant.
pub fn duplicate_digits(digits: &[u8; DIGIT_COUNT]) -> Vec<u8> {
    let counts = digit_counts(digits);
    (0..10u8).filter(|&d| counts[d as usize] >= 2).collect()
}

pub fn classify(digits: &[u8; DIGIT_COUNT]) -> DuplicateClass {
    let counts = digit_counts(digits);
    let dups = duplicate_digits(digits);
    let count_of = |d: u8| counts[d as usize];

    match dups.as_slice() {
        [] => DuplicateClass::NoDuplicate,
        [d] if count_of(*d) >= 3 => DuplicateClass::Other,
        [_] => DuplicateClass::SinglePair,
        [a, b] if count_of(*a) >= 3 && count_of(*b) >= 3 => DuplicateClass::Other,
        [_, _] => DuplicateClass::TwoPairs,
        _ => DuplicateClass::Other,
    }
}

/// Occurrences du chiffre le plus répété ; 0 si aucun chiffre n'est répété.
pub fn occurrence_level(digits: &[u8; DIGIT_COUNT]) -> u8 {
    let max = digit_counts(digits).into_iter().max().unwrap_or(0);
    if max >= 2 {
        max
    } else {
        0
    }
}

/// Motif O/X : O aux positions occupées par `digit`.
pub fn position_pattern(digits: &[u8; DIGIT_COUNT], digit: u8) -> String {
    digits
        .iter()
        .map(|&d| if d == digit { 'O' } else { 'X' })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketStat {
    pub class: DuplicateClass,
    pub count: u32,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DigitRank {
    pub digit: u8,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternDetail {
    pub pattern: String,
    pub count: u32,
    /// Part du total des tirages à un seul doublon.
    pub percentage: f64,
    pub examples: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelStat {
    pub level: u8,
    pub count: u32,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateAnalysis {
    pub total_records: usize,
    /// Toujours les quatre classes, dans l'ordre de `DuplicateClass::ALL`.
    pub buckets: Vec<BucketStat>,
    /// Chiffre doublé dans les tirages à un seul doublon, par fréquence décroissante.
    pub single_duplicate_ranking: Vec<DigitRank>,
    pub single_pair_total: u32,
    /// Motifs O/X des tirages à un seul doublon, par fréquence décroissante.
    pub patterns: Vec<PatternDetail>,
    pub occurrence_levels: Vec<LevelStat>,
}

impl DuplicateAnalysis {
    pub fn bucket(&self, class: DuplicateClass) -> BucketStat {
        self.buckets
            .iter()
            .find(|b| b.class == class)
            .copied()
            .unwrap_or(BucketStat {
                class,
                count: 0,
                ratio: 0.0,
            })
    }

    pub fn pattern(&self, pattern: &str) -> Option<&PatternDetail> {
        self.patterns.iter().find(|p| p.pattern == pattern)
    }

    pub fn ranking_count(&self, digit: u8) -> u32 {
        self.single_duplicate_ranking
            .iter()
            .find(|r| r.digit == digit)
            .map(|r| r.count)
            .unwrap_or(0)
    }

    pub fn level_count(&self, level: u8) -> u32 {
        self.occurrence_levels
            .iter()
            .find(|l| l.level == level)
            .map(|l| l.count)
            .unwrap_or(0)
    }
}

pub fn analyze_duplicates(records: &[DrawRecord]) -> DuplicateAnalysis {
    let total = records.len();

    let mut class_counts: HashMap<DuplicateClass, u32> = HashMap::new();
    let mut digit_ranking = [0u32; 10];
    let mut pattern_counts: HashMap<String, (u32, Vec<u32>)> = HashMap::new();
    let mut level_counts = [0u32; DIGIT_COUNT + 1];
    let mut single_pair_total = 0u32;

    for record in records {
        let class = classify(&record.digits);
        *class_counts.entry(class).or_insert(0) += 1;
        level_counts[occurrence_level(&record.digits) as usize] += 1;

        if class == DuplicateClass::SinglePair {
            single_pair_total += 1;
            if let Some(&digit) = duplicate_digits(&record.digits).first() {
                digit_ranking[digit as usize] += 1;
                let entry = pattern_counts
                    .entry(position_pattern(&record.digits, digit))
                    .or_insert_with(|| (0, Vec::new()));
                entry.0 += 1;
                if entry.1.len() < MAX_PATTERN_EXAMPLES {
                    entry.1.push(record.round_id);
                }
            }
        }
    }

    let buckets = DuplicateClass::ALL
        .iter()
        .map(|&class| {
            let count = class_counts.get(&class).copied().unwrap_or(0);
            BucketStat {
                class,
                count,
                ratio: ratio(count as usize, total),
            }
        })
        .collect();

    let mut single_duplicate_ranking: Vec<DigitRank> = (0..10u8)
        .filter(|&d| digit_ranking[d as usize] > 0)
        .map(|d| DigitRank {
            digit: d,
            count: digit_ranking[d as usize],
        })
        .collect();
    single_duplicate_ranking.sort_by(|a, b| b.count.cmp(&a.count).then(a.digit.cmp(&b.digit)));

    let mut patterns: Vec<PatternDetail> = pattern_counts
        .into_iter()
        .map(|(pattern, (count, examples))| PatternDetail {
            pattern,
            count,
            percentage: ratio(count as usize, single_pair_total as usize) * 100.0,
            examples,
        })
        .collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));

    let occurrence_levels = OCCURRENCE_LEVELS
        .iter()
        .map(|&level| LevelStat {
            level,
            count: level_counts[level as usize],
            ratio: ratio(level_counts[level as usize] as usize, total),
        })
        .collect();

    DuplicateAnalysis {
        total_records: total,
        buckets,
        single_duplicate_ranking,
        single_pair_total,
        patterns,
        occurrence_levels,
    }
}
