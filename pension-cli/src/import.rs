use std::path::Path;

use anyhow::{Context, Result};

use pension_db::models::{DrawRecord, Row};
use pension_db::store::{parse_row_fields, FileStore};

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// `;` si la première ligne en contient, sinon `,`.
fn detect_delimiter(content: &str) -> u8 {
    match content.lines().next() {
        Some(line) if line.contains(';') => b';',
        _ => b',',
    }
}

fn is_header(record: &csv::StringRecord) -> bool {
    record
        .get(0)
        .map(|field| field.trim().parse::<i64>().is_err())
        .unwrap_or(false)
}

fn parse_record(record: &csv::StringRecord) -> Result<Row> {
    let fields: Vec<&str> = record.iter().filter(|f| !f.trim().is_empty()).collect();
    let row = parse_row_fields(&fields)?;
    DrawRecord::from_row(&row)?;
    Ok(row)
}

pub fn import_csv(store: &FileStore, path: &Path) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(&content))
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };
    let mut rows = Vec::new();

    for (line, record_result) in reader.records().enumerate() {
        match record_result {
            Ok(record) if line == 0 && is_header(&record) => continue,
            Ok(record) => {
                result.total_records += 1;
                match parse_record(&record) {
                    Ok(row) => rows.push(row),
                    Err(e) => {
                        eprintln!("Erreur parsing ligne {}: {}", line + 1, e);
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                result.total_records += 1;
                eprintln!("Erreur lecture ligne {}: {}", line + 1, e);
                result.errors += 1;
            }
        }
    }

    let (inserted, skipped) = store
        .append_rows(&rows)
        .context("Échec de l'enregistrement des tirages importés")?;
    result.inserted = inserted as u32;
    result.skipped = skipped as u32;
    Ok(result)
}
