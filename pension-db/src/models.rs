use crate::error::{StoreError, StoreResult};

/// Nombre de chiffres d'un tirage.
pub const DIGIT_COUNT: usize = 6;
/// Taille d'une ligne stockée : tirage, groupe, 6 chiffres, 6 chiffres bonus.
pub const ROW_LEN: usize = 14;
pub const MAX_COMBINED: u32 = 999_999;

pub type Row = [i64; ROW_LEN];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    pub round_id: u32,
    pub group_id: u8,
    pub digits: [u8; DIGIT_COUNT],
    pub bonus_digits: [u8; DIGIT_COUNT],
}

impl DrawRecord {
    /// Valeur à 6 chiffres (zéros en tête inclus), jamais stockée séparément.
    pub fn combined_value(&self) -> u32 {
        combine_digits(&self.digits)
    }

    pub fn bonus_combined_value(&self) -> u32 {
        combine_digits(&self.bonus_digits)
    }

    pub fn digit_sum(&self) -> u32 {
        digit_sum(&self.digits)
    }

    /// Le tirage bonus vu comme un tirage indépendant (même numéro de tirage).
    pub fn bonus_record(&self) -> DrawRecord {
        DrawRecord {
            round_id: self.round_id,
            group_id: self.group_id,
            digits: self.bonus_digits,
            bonus_digits: self.bonus_digits,
        }
    }

    pub fn from_row(row: &Row) -> StoreResult<Self> {
        let round_id = check_range("tirage", row[0], 0, u32::MAX as i64)? as u32;
        let group_id = check_range("groupe", row[1], 1, 5)? as u8;

        let mut digits = [0u8; DIGIT_COUNT];
        let mut bonus_digits = [0u8; DIGIT_COUNT];
        for i in 0..DIGIT_COUNT {
            digits[i] = check_range("chiffre", row[2 + i], 0, 9)? as u8;
            bonus_digits[i] = check_range("chiffre bonus", row[8 + i], 0, 9)? as u8;
        }

        Ok(DrawRecord {
            round_id,
            group_id,
            digits,
            bonus_digits,
        })
    }

    pub fn to_row(&self) -> Row {
        let mut row = [0i64; ROW_LEN];
        row[0] = self.round_id as i64;
        row[1] = self.group_id as i64;
        for i in 0..DIGIT_COUNT {
            row[2 + i] = self.digits[i] as i64;
            row[8 + i] = self.bonus_digits[i] as i64;
        }
        row
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> StoreResult<i64> {
    if value < min || value > max {
        return Err(StoreError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

pub fn combine_digits(digits: &[u8; DIGIT_COUNT]) -> u32 {
    digits.iter().fold(0u32, |acc, &d| acc * 10 + d as u32)
}

/// Inverse de `combine_digits`. `None` au-delà de 999999.
pub fn split_value(value: u32) -> Option<[u8; DIGIT_COUNT]> {
    if value > MAX_COMBINED {
        return None;
    }
    let mut digits = [0u8; DIGIT_COUNT];
    let mut rest = value;
    for slot in digits.iter_mut().rev() {
        *slot = (rest % 10) as u8;
        rest /= 10;
    }
    Some(digits)
}

pub fn digit_sum(digits: &[u8; DIGIT_COUNT]) -> u32 {
    digits.iter().map(|&d| d as u32).sum()
}

/// Convertit les lignes brutes en tirages. Le groupe et les chiffres bonus
/// sont conservés mais seuls `round_id` et `digits` alimentent les analyses.
pub fn parse_lottery_data(rows: &[Row]) -> StoreResult<Vec<DrawRecord>> {
    rows.iter().map(DrawRecord::from_row).collect()
}

// ── Sélection ──

/// Les `count` tirages les plus récents (collection triée par tirage décroissant).
pub fn recent(records: &[DrawRecord], count: usize) -> Vec<DrawRecord> {
    records.iter().take(count).cloned().collect()
}

pub fn by_range(records: &[DrawRecord], start: u32, end: u32) -> Vec<DrawRecord> {
    records
        .iter()
        .filter(|r| r.round_id >= start && r.round_id <= end)
        .cloned()
        .collect()
}

pub fn extract_numbers(records: &[DrawRecord], include_bonus: bool) -> Vec<u32> {
    let mut numbers = Vec::with_capacity(records.len() * if include_bonus { 2 } else { 1 });
    for record in records {
        numbers.push(record.combined_value());
        if include_bonus {
            numbers.push(record.bonus_combined_value());
        }
    }
    numbers
}

/// Tirages pour les analyses de fréquence : avec `include_bonus`, chaque tirage
/// est suivi de son tirage bonus.
pub fn frequency_set(records: &[DrawRecord], include_bonus: bool) -> Vec<DrawRecord> {
    if !include_bonus {
        return records.to_vec();
    }
    records
        .iter()
        .flat_map(|r| [r.clone(), r.bonus_record()])
        .collect()
}

pub fn latest(records: &[DrawRecord]) -> Option<&DrawRecord> {
    records.iter().max_by_key(|r| r.round_id)
}

/// Jeu de tirages déterministe pour les tests (tirage décroissant, `n` en tête).
pub fn make_test_records(n: usize) -> Vec<DrawRecord> {
    (0..n)
        .rev()
        .map(|i| {
            let base = (i % 10) as u8;
            DrawRecord {
                round_id: (i + 1) as u32,
                group_id: (i % 5) as u8 + 1,
                digits: [
                    base,
                    (base + 1) % 10,
                    (base + 3) % 10,
                    (base + 7) % 10,
                    (base * 3) % 10,
                    ((i / 10) % 10) as u8,
                ],
                bonus_digits: [9 - base, 1, 2, 3, 4, 5],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row() {
        let row: Row = [42, 3, 0, 9, 4, 6, 7, 8, 1, 2, 3, 4, 5, 6];
        let records = parse_lottery_data(&[row]).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.round_id, 42);
        assert_eq!(r.group_id, 3);
        assert_eq!(r.digits, [0, 9, 4, 6, 7, 8]);
        assert_eq!(r.bonus_digits, [1, 2, 3, 4, 5, 6]);
        assert_eq!(r.combined_value(), 94678);
        assert_eq!(r.to_row(), row);
    }

    #[test]
    fn test_digit_out_of_range() {
        let row: Row = [1, 1, 0, 10, 4, 6, 7, 8, 1, 2, 3, 4, 5, 6];
        assert!(matches!(
            DrawRecord::from_row(&row),
            Err(StoreError::OutOfRange { field: "chiffre", value: 10, .. })
        ));
    }

    #[test]
    fn test_group_out_of_range() {
        let row: Row = [1, 6, 0, 1, 4, 6, 7, 8, 1, 2, 3, 4, 5, 6];
        assert!(DrawRecord::from_row(&row).is_err());
        let row: Row = [-1, 1, 0, 1, 4, 6, 7, 8, 1, 2, 3, 4, 5, 6];
        assert!(DrawRecord::from_row(&row).is_err());
    }

    #[test]
    fn test_split_value() {
        assert_eq!(split_value(94678), Some([0, 9, 4, 6, 7, 8]));
        assert_eq!(split_value(0), Some([0; 6]));
        assert_eq!(split_value(999_999), Some([9; 6]));
        assert_eq!(split_value(1_000_000), None);
        for v in [1u32, 10, 123_456, 500_005] {
            assert_eq!(combine_digits(&split_value(v).unwrap()), v);
        }
    }

    #[test]
    fn test_recent_and_range() {
        let records = make_test_records(20);
        assert_eq!(records[0].round_id, 20);
        let last = recent(&records, 5);
        assert_eq!(last.len(), 5);
        assert_eq!(last[4].round_id, 16);

        let range = by_range(&records, 3, 7);
        assert_eq!(range.len(), 5);
        assert!(range.iter().all(|r| (3..=7).contains(&r.round_id)));
        assert_eq!(latest(&records).unwrap().round_id, 20);
    }

    #[test]
    fn test_bonus_inclusion() {
        let records = make_test_records(3);
        assert_eq!(extract_numbers(&records, false).len(), 3);
        let with_bonus = extract_numbers(&records, true);
        assert_eq!(with_bonus.len(), 6);
        assert_eq!(with_bonus[1], records[0].bonus_combined_value());

        let set = frequency_set(&records, true);
        assert_eq!(set.len(), 6);
        assert_eq!(set[1].digits, records[0].bonus_digits);
        assert_eq!(set[1].round_id, records[0].round_id);
    }
}
