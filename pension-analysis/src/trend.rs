use serde::Serialize;

use pension_db::models::DrawRecord;

use crate::transition::sorted_ascending;

/// Variation minimale (en valeur absolue) pour qu'un tirage compte comme hausse ou baisse.
pub const TREND_THRESHOLD: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn from_change(change: i64) -> Self {
        if change > TREND_THRESHOLD {
            TrendDirection::Up
        } else if change < -TREND_THRESHOLD {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Stable => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub round_id: u32,
    pub value: u32,
    /// 0 pour le premier tirage de la série.
    pub change: i64,
    /// `None` si la valeur précédente est nulle (ou pour le premier tirage).
    pub change_percent: Option<f64>,
    pub direction: TrendDirection,
    pub volatility: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    /// Statistiques calculées sur les variations non nulles uniquement.
    pub nonzero_changes: usize,
    pub avg_change: f64,
    pub avg_volatility: f64,
    pub largest_rise: i64,
    pub largest_fall: i64,
    pub up_count: usize,
    pub down_count: usize,
    pub stable_count: usize,
    pub longest_up_run: usize,
    pub longest_down_run: usize,
}

impl TrendSeries {
    /// Les `n` derniers points (les plus récents).
    pub fn tail(&self, n: usize) -> &[TrendPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

pub fn trend_series(records: &[DrawRecord]) -> TrendSeries {
    let sorted = sorted_ascending(records);

    let mut points = Vec::with_capacity(sorted.len());
    let mut previous: Option<u32> = None;
    for record in &sorted {
        let value = record.combined_value();
        let point = match previous {
            None => TrendPoint {
                round_id: record.round_id,
                value,
                change: 0,
                change_percent: None,
                direction: TrendDirection::Stable,
                volatility: 0,
            },
            Some(prev) => {
                let change = value as i64 - prev as i64;
                TrendPoint {
                    round_id: record.round_id,
                    value,
                    change,
                    change_percent: (prev != 0).then(|| change as f64 / prev as f64 * 100.0),
                    direction: TrendDirection::from_change(change),
                    volatility: change.unsigned_abs(),
                }
            }
        };
        points.push(point);
        previous = Some(value);
    }

    let changed: Vec<&TrendPoint> = points.iter().filter(|p| p.change != 0).collect();
    let n = changed.len();
    let (avg_change, avg_volatility) = if n == 0 {
        (0.0, 0.0)
    } else {
        (
            changed.iter().map(|p| p.change as f64).sum::<f64>() / n as f64,
            changed.iter().map(|p| p.volatility as f64).sum::<f64>() / n as f64,
        )
    };

    // Séries de hausses / baisses : un tirage stable interrompt la série en cours
    let mut longest_up_run = 0;
    let mut longest_down_run = 0;
    let mut run = 0;
    let mut run_direction = TrendDirection::Stable;
    for point in &changed {
        match point.direction {
            TrendDirection::Stable => {
                run = 0;
                run_direction = TrendDirection::Stable;
            }
            dir => {
                run = if dir == run_direction { run + 1 } else { 1 };
                run_direction = dir;
                if dir == TrendDirection::Up {
                    longest_up_run = longest_up_run.max(run);
                } else {
                    longest_down_run = longest_down_run.max(run);
                }
            }
        }
    }

    let count = |dir: TrendDirection| points.iter().skip(1).filter(|p| p.direction == dir).count();

    TrendSeries {
        nonzero_changes: n,
        avg_change,
        avg_volatility,
        largest_rise: changed.iter().map(|p| p.change).max().unwrap_or(0),
        largest_fall: changed.iter().map(|p| p.change).min().unwrap_or(0),
        up_count: count(TrendDirection::Up),
        down_count: count(TrendDirection::Down),
        stable_count: count(TrendDirection::Stable),
        longest_up_run,
        longest_down_run,
        points,
    }
}
