//! Input dataset reader
//!
//! Reads organization names from one named column of a CSV file. Source
//! files are often exported from spreadsheets as Windows-1252, so any field
//! that is not valid UTF-8 is decoded as Windows-1252 instead of rejecting
//! the row.

use crate::InputError;
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One input record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Stable position in the input, after empty cells are dropped
    pub index: usize,
    pub name: String,
}

/// Loads entities from the CSV file at `path`
pub fn load_entities(path: &Path, column: &str) -> Result<Vec<Entity>, InputError> {
    let file = File::open(path)?;
    read_entities(file, column)
}

/// Reads entities from any CSV source with a header row
///
/// Empty cells are skipped; every other value is trimmed and keeps its
/// place, so a cell holding only whitespace becomes an entity with an empty
/// name. Indices are assigned in file order, starting at 0.
pub fn read_entities<R: Read>(reader: R, column: &str) -> Result<Vec<Entity>, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let position = reader
        .byte_headers()?
        .iter()
        .position(|h| decode_field(h).trim().trim_start_matches('\u{feff}') == column)
        .ok_or_else(|| InputError::MissingColumn(column.to_string()))?;

    let mut entities = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let Some(raw) = record.get(position).filter(|raw| !raw.is_empty()) else {
            continue;
        };

        entities.push(Entity {
            index: entities.len(),
            name: decode_field(raw).trim().to_string(),
        });
    }

    tracing::debug!("Read {} entities from column '{}'", entities.len(), column);
    Ok(entities)
}

/// Decodes one raw field, falling back to Windows-1252 when it is not UTF-8
fn decode_field(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252
            .decode_without_bom_handling(raw)
            .0
            .into_owned(),
    }
}
