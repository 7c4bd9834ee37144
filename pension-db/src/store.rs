use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::models::{parse_lottery_data, DrawRecord, Row, ROW_LEN};

pub fn data_path() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("pension_lottery.json");
    path
}

/// Fichier plat de lignes de 14 entiers, trié par tirage décroissant.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lit toutes les lignes. Un fichier absent est une collection vide ;
    /// un fichier illisible ou mal formé est une erreur.
    pub fn read_rows(&self) -> StoreResult<Vec<Row>> {
        if !self.path.exists() {
            log::info!("Aucun fichier de données à {:?}, collection vide", self.path);
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let raw: Vec<Vec<Value>> =
            serde_json::from_str(&json).map_err(|source| self.json_error(source))?;

        raw.iter().map(|row| validate_row(row)).collect()
    }

    pub fn load_records(&self) -> StoreResult<Vec<DrawRecord>> {
        let rows = self.read_rows()?;
        let records = parse_lottery_data(&rows)?;
        log::debug!("{} tirages chargés depuis {:?}", records.len(), self.path);
        Ok(records)
    }

    pub fn count_rows(&self) -> StoreResult<usize> {
        Ok(self.read_rows()?.len())
    }

    /// Valide et ajoute une ligne brute. Retourne la collection complète, triée.
    pub fn append(&self, raw: &[Value]) -> StoreResult<Vec<Row>> {
        let row = validate_row(raw)?;
        self.append_row(row)
    }

    pub fn append_row(&self, row: Row) -> StoreResult<Vec<Row>> {
        let record = DrawRecord::from_row(&row)?;
        let mut rows = self.read_rows()?;

        if rows.iter().any(|r| r[0] == row[0]) {
            return Err(StoreError::DuplicateRound {
                round_id: record.round_id,
            });
        }

        rows.push(row);
        rows.sort_by(|a, b| b[0].cmp(&a[0]));
        self.write_rows(&rows)?;

        log::info!(
            "Tirage {} ajouté ({} tirages au total)",
            record.round_id,
            rows.len()
        );
        Ok(rows)
    }

    pub fn append_record(&self, record: &DrawRecord) -> StoreResult<Vec<Row>> {
        self.append_row(record.to_row())
    }

    /// Ajout groupé en une seule écriture. Les tirages déjà connus, ou répétés
    /// dans le lot, sont ignorés. Retourne (ajoutés, ignorés).
    pub fn append_rows(&self, new_rows: &[Row]) -> StoreResult<(usize, usize)> {
        for row in new_rows {
            DrawRecord::from_row(row)?;
        }

        let mut rows = self.read_rows()?;
        let mut known: HashSet<i64> = rows.iter().map(|r| r[0]).collect();
        let (mut inserted, mut skipped) = (0, 0);
        for row in new_rows {
            if known.insert(row[0]) {
                rows.push(*row);
                inserted += 1;
            } else {
                skipped += 1;
            }
        }

        if inserted > 0 {
            rows.sort_by(|a, b| b[0].cmp(&a[0]));
            self.write_rows(&rows)?;
        }
        log::info!("{} tirages ajoutés, {} déjà présents", inserted, skipped);
        Ok((inserted, skipped))
    }

    fn write_rows(&self, rows: &[Row]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let json = serde_json::to_string_pretty(rows).map_err(|source| self.json_error(source))?;

        // Écriture dans un fichier temporaire puis renommage : pas de fichier à moitié écrit.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| self.io_error(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> StoreError {
        StoreError::Json {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Vérifie la forme d'une ligne brute : 14 éléments, tous entiers.
pub fn validate_row(raw: &[Value]) -> StoreResult<Row> {
    if raw.len() != ROW_LEN {
        return Err(StoreError::InvalidLength {
            expected: ROW_LEN,
            actual: raw.len(),
        });
    }

    let mut row = [0i64; ROW_LEN];
    for (index, value) in raw.iter().enumerate() {
        row[index] = value.as_i64().ok_or_else(|| StoreError::NonNumeric {
            index,
            value: value.to_string(),
        })?;
    }
    Ok(row)
}

/// Même validation pour des champs texte (ligne de commande, CSV).
pub fn parse_row_fields<S: AsRef<str>>(fields: &[S]) -> StoreResult<Row> {
    if fields.len() != ROW_LEN {
        return Err(StoreError::InvalidLength {
            expected: ROW_LEN,
            actual: fields.len(),
        });
    }

    let mut row = [0i64; ROW_LEN];
    for (index, field) in fields.iter().enumerate() {
        let field = field.as_ref().trim();
        row[index] = field.parse::<i64>().map_err(|_| StoreError::NonNumeric {
            index,
            value: field.to_string(),
        })?;
    }
    Ok(row)
}
