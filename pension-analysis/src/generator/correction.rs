use rand::Rng;
use serde::Serialize;

use pension_db::models::{combine_digits, digit_sum, split_value, DIGIT_COUNT, MAX_COMBINED};

use super::GeneratorContext;
use crate::config::GeneratorConfig;
use crate::digit_sum::MAX_DIGIT_SUM;
use crate::retry::{refine_bounded, search_bounded, Retry};
use crate::sampling::uniform_digits;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SumCorrection {
    /// Nombre de passes d'ajustement effectuées.
    pub attempts: usize,
    pub within_tolerance: bool,
    /// Chiffres redessinés uniformément (somme hors de [0, 54]).
    pub regenerated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeltaCorrection {
    /// Écart déjà dans la bande.
    NotNeeded,
    /// Pas assez d'historique pour définir une bande.
    Skipped,
    SnappedToAverage,
    Resampled { attempts: usize },
    /// Budget épuisé : chiffres conservés tels quels.
    Failed,
}

impl std::fmt::Display for DeltaCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeltaCorrection::NotNeeded => write!(f, "aucune"),
            DeltaCorrection::Skipped => write!(f, "ignorée"),
            DeltaCorrection::SnappedToAverage => write!(f, "écart moyen"),
            DeltaCorrection::Resampled { attempts } => write!(f, "retirage ({} essais)", attempts),
            DeltaCorrection::Failed => write!(f, "échec"),
        }
    }
}

/// Une passe : jusqu'à `min(|écart|, 6)` positions tirées au hasard (avec remise)
/// montent ou descendent d'une unité, dans les bornes 0..=9.
fn nudge_towards<R: Rng + ?Sized>(
    digits: &[u8; DIGIT_COUNT],
    target: u32,
    rng: &mut R,
) -> [u8; DIGIT_COUNT] {
    let mut next = *digits;
    let diff = target as i64 - digit_sum(digits) as i64;
    let adjust = diff.unsigned_abs().min(DIGIT_COUNT as u64);

    for _ in 0..adjust {
        let pos = rng.random_range(0..DIGIT_COUNT);
        if diff > 0 && next[pos] < 9 {
            next[pos] += 1;
        } else if diff < 0 && next[pos] > 0 {
            next[pos] -= 1;
        }
    }
    next
}

/// Rapproche la somme des chiffres de `target` à `sum_tolerance` près.
pub fn correct_sum<R: Rng + ?Sized>(
    digits: [u8; DIGIT_COUNT],
    target: u32,
    config: &GeneratorConfig,
    rng: &mut R,
) -> ([u8; DIGIT_COUNT], SumCorrection) {
    let tolerance = config.sum_tolerance;
    let within = |d: &[u8; DIGIT_COUNT]| digit_sum(d).abs_diff(target) <= tolerance;

    let result = refine_bounded(digits, config.max_sum_attempts, within, |current| {
        nudge_towards(current, target, rng)
    });

    let attempts = result.attempts();
    let within_tolerance = result.is_accepted();
    let mut corrected = result.into_last().unwrap_or(digits);
    if !within_tolerance {
        log::warn!(
            "Somme {} hors tolérance de {} après {} passes",
            digit_sum(&corrected),
            target,
            attempts
        );
    }

    let regenerated =
        corrected.iter().any(|&d| d > 9) || digit_sum(&corrected) > MAX_DIGIT_SUM;
    if regenerated {
        log::warn!("Somme invalide : tirage uniforme de secours");
        corrected = uniform_digits(rng);
    }

    (
        corrected,
        SumCorrection {
            attempts,
            within_tolerance,
            regenerated,
        },
    )
}

fn to_digits(value: i64) -> Option<[u8; DIGIT_COUNT]> {
    if !(0..=MAX_COMBINED as i64).contains(&value) {
        return None;
    }
    split_value(value as u32)
}

/// Ramène l'écart avec le tirage précédent dans la bande historique
/// (intersection de [min, max] et de moyenne ± σ·écart-type).
pub fn correct_delta<R: Rng + ?Sized>(
    digits: [u8; DIGIT_COUNT],
    context: &GeneratorContext,
    config: &GeneratorConfig,
    rng: &mut R,
) -> ([u8; DIGIT_COUNT], DeltaCorrection) {
    let Some(previous) = context.previous.as_ref() else {
        return (digits, DeltaCorrection::Skipped);
    };
    let Some((lower, upper)) = context.comparison.effective_band(config.band_sigma) else {
        return (digits, DeltaCorrection::Skipped);
    };

    let prev_value = previous.combined_value() as i64;
    let in_band = |d: &[u8; DIGIT_COUNT]| {
        let delta = (combine_digits(d) as i64 - prev_value) as f64;
        delta >= lower && delta <= upper
    };

    if in_band(&digits) {
        return (digits, DeltaCorrection::NotNeeded);
    }

    let snapped = to_digits(prev_value + context.comparison.avg_change.round() as i64);
    if let Some(snapped) = snapped.filter(|d| in_band(d)) {
        log::debug!("Écart hors bande : valeur ramenée à l'écart moyen");
        return (snapped, DeltaCorrection::SnappedToAverage);
    }

    let (lo, hi) = (lower.ceil() as i64, upper.floor() as i64);
    let result = search_bounded(
        config.max_delta_attempts,
        |_| {
            if lo > hi {
                return None;
            }
            to_digits(prev_value + rng.random_range(lo..=hi))
        },
        in_band,
    );

    match result {
        Retry::Accepted { value, attempts } => {
            log::debug!("Écart corrigé après {} essais", attempts);
            (value, DeltaCorrection::Resampled { attempts })
        }
        Retry::Exhausted { attempts, .. } => {
            log::warn!(
                "Aucun écart valide en {} essais, chiffres conservés",
                attempts
            );
            (digits, DeltaCorrection::Failed)
        }
    }
}
