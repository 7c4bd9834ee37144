use serde::Serialize;

use pension_db::models::{DrawRecord, DIGIT_COUNT};

use crate::ratio;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DigitCount {
    pub digit: u8,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PositionFrequency {
    /// Position 1 à 6, de gauche à droite.
    pub position: usize,
    pub total: usize,
    pub digit_frequency: [u32; 10],
    pub highest: DigitCount,
    pub lowest: DigitCount,
}

impl PositionFrequency {
    pub fn count(&self, digit: u8) -> u32 {
        self.digit_frequency.get(digit as usize).copied().unwrap_or(0)
    }

    pub fn percentage(&self, digit: u8) -> f64 {
        ratio(self.count(digit) as usize, self.total) * 100.0
    }

    fn digit_count(&self, digit: u8) -> DigitCount {
        DigitCount {
            digit,
            count: self.count(digit),
            percentage: self.percentage(digit),
        }
    }
}

/// Tables de fréquence par position. À égalité, le premier chiffre (0→9) l'emporte.
pub fn analyze_position_frequency(records: &[DrawRecord]) -> [PositionFrequency; DIGIT_COUNT] {
    std::array::from_fn(|pos| {
        let mut table = PositionFrequency {
            position: pos + 1,
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            table.digit_frequency[record.digits[pos] as usize] += 1;
        }

        let mut highest = 0u8;
        let mut lowest = 0u8;
        for d in 1..10u8 {
            if table.count(d) > table.count(highest) {
                highest = d;
            }
            if table.count(d) < table.count(lowest) {
                lowest = d;
            }
        }
        table.highest = table.digit_count(highest);
        table.lowest = table.digit_count(lowest);
        table
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pension_db::models::make_test_records;

    fn record(round_id: u32, digits: [u8; 6]) -> DrawRecord {
        DrawRecord {
            round_id,
            group_id: 1,
            digits,
            bonus_digits: [0; 6],
        }
    }

    #[test]
    fn test_constant_first_position() {
        let records: Vec<DrawRecord> = (0..12)
            .map(|i| record(i, [5, (i % 10) as u8, 0, 0, 0, 0]))
            .collect();
        let tables = analyze_position_frequency(&records);
        assert_eq!(tables[0].position, 1);
        assert_eq!(tables[0].highest.digit, 5);
        assert_eq!(tables[0].highest.count, 12);
        assert!((tables[0].highest.percentage - 100.0).abs() < 1e-10);
        // Plusieurs chiffres à 0 : le premier (0) est retenu
        assert_eq!(tables[0].lowest.digit, 0);
        assert_eq!(tables[0].lowest.count, 0);
    }

    #[test]
    fn test_ties_resolve_to_first_digit() {
        let records = vec![record(1, [3, 0, 0, 0, 0, 0]), record(2, [7, 0, 0, 0, 0, 0])];
        let tables = analyze_position_frequency(&records);
        assert_eq!(tables[0].highest.digit, 3);
        assert_eq!(tables[0].lowest.digit, 0);
        assert_eq!(tables[1].highest.digit, 0);
        assert_eq!(tables[1].lowest.digit, 1);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let records = make_test_records(57);
        for table in analyze_position_frequency(&records) {
            assert_eq!(table.digit_frequency.iter().sum::<u32>(), 57);
        }
    }

    #[test]
    fn test_empty_records() {
        let tables = analyze_position_frequency(&[]);
        for table in &tables {
            assert_eq!(table.total, 0);
            assert_eq!(table.highest.count, 0);
            assert_eq!(table.highest.percentage, 0.0);
        }
    }
}
