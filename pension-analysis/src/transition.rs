use serde::Serialize;

use pension_db::models::{DrawRecord, DIGIT_COUNT};

use crate::{mean, population_std_dev, ratio};

/// Bande d'acceptation autour de l'écart moyen, en écarts-types.
pub const DEFAULT_BAND_SIGMA: f64 = 1.5;

/// Comparaison tirage à tirage des valeurs combinées (ordre croissant de tirage).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundComparison {
    pub total_comparisons: usize,
    pub increase_count: usize,
    pub decrease_count: usize,
    pub same_count: usize,
    pub increase_ratio: f64,
    pub decrease_ratio: f64,
    pub same_ratio: f64,
    /// Amplitudes (positives) moyennes et maximales par sens.
    pub avg_increase: f64,
    pub avg_decrease: f64,
    pub max_increase: i64,
    pub max_decrease: i64,
    pub max_increase_streak: usize,
    pub max_decrease_streak: usize,
    pub max_same_streak: usize,
    pub avg_change: f64,
    pub std_dev: f64,
    pub min_change: i64,
    pub max_change: i64,
    pub lower_band: f64,
    pub upper_band: f64,
    pub within_band_count: usize,
    pub outside_band_count: usize,
    pub within_band_ratio: f64,
    pub outside_band_ratio: f64,
}

impl RoundComparison {
    pub fn band(&self, sigma: f64) -> (f64, f64) {
        (
            self.avg_change - sigma * self.std_dev,
            self.avg_change + sigma * self.std_dev,
        )
    }

    /// Intersection de la bande σ et de l'intervalle [min, max] observé.
    /// `None` sans historique ou si l'intersection est vide.
    pub fn effective_band(&self, sigma: f64) -> Option<(f64, f64)> {
        if self.total_comparisons == 0 {
            return None;
        }
        let (lower, upper) = self.band(sigma);
        let lower = lower.max(self.min_change as f64);
        let upper = upper.min(self.max_change as f64);
        (lower <= upper).then_some((lower, upper))
    }
}

#[derive(Default)]
struct Streak {
    current: usize,
    max: usize,
}

impl Streak {
    fn hit(&mut self, matched: bool) {
        if matched {
            self.current += 1;
            self.max = self.max.max(self.current);
        } else {
            self.current = 0;
        }
    }
}

/// Trie une copie des tirages par numéro croissant.
pub fn sorted_ascending(records: &[DrawRecord]) -> Vec<&DrawRecord> {
    let mut sorted: Vec<&DrawRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.round_id);
    sorted
}

pub fn round_deltas(records: &[DrawRecord]) -> Vec<i64> {
    sorted_ascending(records)
        .windows(2)
        .map(|w| w[1].combined_value() as i64 - w[0].combined_value() as i64)
        .collect()
}

pub fn compare_rounds(records: &[DrawRecord]) -> RoundComparison {
    compare_rounds_with(records, DEFAULT_BAND_SIGMA)
}

pub fn compare_rounds_with(records: &[DrawRecord], band_sigma: f64) -> RoundComparison {
    let deltas = round_deltas(records);
    let total = deltas.len();

    let mut increases = Vec::new();
    let mut decreases = Vec::new();
    let mut same_count = 0;
    let mut up = Streak::default();
    let mut down = Streak::default();
    let mut same = Streak::default();

    for &delta in &deltas {
        up.hit(delta > 0);
        down.hit(delta < 0);
        same.hit(delta == 0);
        match delta.signum() {
            1 => increases.push(delta),
            -1 => decreases.push(-delta),
            _ => same_count += 1,
        }
    }

    let as_f64 = |v: &[i64]| v.iter().map(|&d| d as f64).collect::<Vec<f64>>();
    let all = as_f64(&deltas);
    let avg_change = mean(&all);
    let std_dev = population_std_dev(&all);
    let lower_band = avg_change - band_sigma * std_dev;
    let upper_band = avg_change + band_sigma * std_dev;

    let within_band_count = all
        .iter()
        .filter(|&&d| d >= lower_band && d <= upper_band)
        .count();

    RoundComparison {
        total_comparisons: total,
        increase_count: increases.len(),
        decrease_count: decreases.len(),
        same_count,
        increase_ratio: ratio(increases.len(), total),
        decrease_ratio: ratio(decreases.len(), total),
        same_ratio: ratio(same_count, total),
        avg_increase: mean(&as_f64(&increases)),
        avg_decrease: mean(&as_f64(&decreases)),
        max_increase: increases.iter().copied().max().unwrap_or(0),
        max_decrease: decreases.iter().copied().max().unwrap_or(0),
        max_increase_streak: up.max,
        max_decrease_streak: down.max,
        max_same_streak: same.max,
        avg_change,
        std_dev,
        min_change: deltas.iter().copied().min().unwrap_or(0),
        max_change: deltas.iter().copied().max().unwrap_or(0),
        lower_band,
        upper_band,
        within_band_count,
        outside_band_count: total - within_band_count,
        within_band_ratio: ratio(within_band_count, total),
        outside_band_ratio: ratio(total - within_band_count, total),
    }
}

// ── Transitions par position ──

/// Ligne de la matrice : chiffre précédent → chiffre suivant, à une position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRow {
    pub from_digit: u8,
    pub total: u32,
    pub counts: [u32; 10],
    pub probabilities: [f64; 10],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionTransitions {
    /// Position 1 à 6.
    pub position: usize,
    pub rows: [TransitionRow; 10],
}

impl PositionTransitions {
    pub fn probability(&self, from: u8, to: u8) -> f64 {
        self.rows
            .get(from as usize)
            .and_then(|row| row.probabilities.get(to as usize))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn count(&self, from: u8, to: u8) -> u32 {
        self.rows
            .get(from as usize)
            .and_then(|row| row.counts.get(to as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Chiffres suivants observés après `from`, par probabilité décroissante.
    pub fn top_next(&self, from: u8, limit: usize) -> Vec<(u8, f64)> {
        let Some(row) = self.rows.get(from as usize) else {
            return Vec::new();
        };
        let mut next: Vec<(u8, f64)> = (0..10u8)
            .filter(|&d| row.counts[d as usize] > 0)
            .map(|d| (d, row.probabilities[d as usize]))
            .collect();
        next.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        next.truncate(limit);
        next
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionAnalysis {
    pub total_transitions: usize,
    pub positions: [PositionTransitions; DIGIT_COUNT],
}

impl TransitionAnalysis {
    /// `position` de 0 à 5.
    pub fn probability(&self, position: usize, from: u8, to: u8) -> f64 {
        self.positions
            .get(position)
            .map(|p| p.probability(from, to))
            .unwrap_or(0.0)
    }
}

/// Modèle de Markov d'ordre 1 par position, estimé sur les tirages consécutifs.
pub fn analyze_position_transitions(records: &[DrawRecord]) -> TransitionAnalysis {
    let sorted = sorted_ascending(records);
    let mut counts = [[[0u32; 10]; 10]; DIGIT_COUNT];

    for pair in sorted.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        for pos in 0..DIGIT_COUNT {
            counts[pos][prev.digits[pos] as usize][next.digits[pos] as usize] += 1;
        }
    }

    let positions = std::array::from_fn(|pos| PositionTransitions {
        position: pos + 1,
        rows: std::array::from_fn(|from| {
            let row_counts = counts[pos][from];
            let total: u32 = row_counts.iter().sum();
            TransitionRow {
                from_digit: from as u8,
                total,
                counts: row_counts,
                probabilities: std::array::from_fn(|to| {
                    ratio(row_counts[to] as usize, total as usize)
                }),
            }
        }),
    });

    TransitionAnalysis {
        total_transitions: sorted.len().saturating_sub(1),
        positions,
    }
}
