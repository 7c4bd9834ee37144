use serde::Serialize;

use pension_db::models::DrawRecord;

use crate::ratio;

/// Somme maximale de 6 chiffres.
pub const MAX_DIGIT_SUM: u32 = 54;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SumBucket {
    pub sum: u32,
    pub count: u32,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitSumAnalysis {
    pub total: usize,
    /// Sommes observées uniquement, par ordre croissant.
    pub distribution: Vec<SumBucket>,
    pub avg_sum: f64,
    pub median_sum: f64,
    /// Somme la plus fréquente ; à égalité, la plus petite.
    pub mode_sum: u32,
    pub min_sum: u32,
    pub max_sum: u32,
}

impl DigitSumAnalysis {
    pub fn count(&self, sum: u32) -> u32 {
        self.distribution
            .iter()
            .find(|b| b.sum == sum)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    /// Somme cible du générateur : moyenne de la moyenne et du mode, arrondie.
    pub fn target_sum(&self) -> u32 {
        ((self.avg_sum + self.mode_sum as f64) / 2.0).round() as u32
    }
}

pub fn analyze_digit_sums(records: &[DrawRecord]) -> DigitSumAnalysis {
    let total = records.len();
    let mut counts = [0u32; MAX_DIGIT_SUM as usize + 1];
    let mut sums: Vec<u32> = records.iter().map(|r| r.digit_sum()).collect();
    for &s in &sums {
        counts[s as usize] += 1;
    }

    if sums.is_empty() {
        return DigitSumAnalysis {
            total: 0,
            distribution: Vec::new(),
            avg_sum: 0.0,
            median_sum: 0.0,
            mode_sum: 0,
            min_sum: 0,
            max_sum: 0,
        };
    }

    sums.sort_unstable();
    let avg_sum = sums.iter().map(|&s| s as f64).sum::<f64>() / total as f64;
    let median_sum = if total % 2 == 0 {
        (sums[total / 2 - 1] + sums[total / 2]) as f64 / 2.0
    } else {
        sums[total / 2] as f64
    };

    let mut mode_sum = 0u32;
    let mut best = 0u32;
    for (sum, &count) in counts.iter().enumerate() {
        if count > best {
            best = count;
            mode_sum = sum as u32;
        }
    }

    let distribution = counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0)
        .map(|(sum, &count)| SumBucket {
            sum: sum as u32,
            count,
            ratio: ratio(count as usize, total),
        })
        .collect();

    DigitSumAnalysis {
        total,
        distribution,
        avg_sum,
        median_sum,
        mode_sum,
        min_sum: sums[0],
        max_sum: sums[total - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(digits: [u8; 6]) -> DrawRecord {
        DrawRecord {
            round_id: 1,
            group_id: 1,
            digits,
            bonus_digits: [0; 6],
        }
    }

    #[test]
    fn test_digit_sums() {
        let records = vec![
            record([1, 2, 3, 4, 5, 6]), // 21
            record([0, 0, 0, 0, 0, 9]), // 9
            record([3, 3, 3, 3, 3, 6]), // 21
            record([9, 9, 9, 9, 9, 9]), // 54
        ];
        let analysis = analyze_digit_sums(&records);

        assert_eq!(analysis.total, 4);
        assert_eq!(analysis.count(21), 2);
        assert_eq!(analysis.count(20), 0);
        assert_eq!(analysis.distribution.len(), 3);
        assert_eq!(analysis.mode_sum, 21);
        assert_eq!(analysis.min_sum, 9);
        assert_eq!(analysis.max_sum, 54);
        assert!((analysis.avg_sum - 26.25).abs() < 1e-12);
        assert!((analysis.median_sum - 21.0).abs() < 1e-12);
        // round((26.25 + 21) / 2) = round(23.625)
        assert_eq!(analysis.target_sum(), 24);

        let ratio_total: f64 = analysis.distribution.iter().map(|b| b.ratio).sum();
        assert!((ratio_total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mode_tie_smallest() {
        let records = vec![record([0, 0, 0, 0, 0, 9]), record([0, 0, 0, 0, 0, 5])];
        let analysis = analyze_digit_sums(&records);
        assert_eq!(analysis.mode_sum, 5);
        assert!((analysis.median_sum - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        let analysis = analyze_digit_sums(&[]);
        assert_eq!(analysis.total, 0);
        assert!(analysis.distribution.is_empty());
        assert_eq!(analysis.avg_sum, 0.0);
        assert_eq!(analysis.target_sum(), 0);
    }
}
