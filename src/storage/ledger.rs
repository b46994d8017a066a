//! Resume ledger
//!
//! The resume point is derived from the persisted rows, never stored. It is
//! one past the highest persisted index; rows that do not parse as a complete
//! result are ignored rather than failing the computation.

use crate::storage::EntityResult;
use csv::ReaderBuilder;
use std::io::Read;

/// Index of the first entity in the input
pub const FIRST_INDEX: usize = 0;

/// Returns one past the highest index, or [`FIRST_INDEX`] when there is none
///
/// An index with no successor (`usize::MAX`) can only come from a damaged
/// file, so it is left out instead of wrapping around.
pub fn next_index<I>(indices: I) -> usize
where
    I: IntoIterator<Item = usize>,
{
    indices
        .into_iter()
        .filter_map(|index| {
            let next = index.checked_add(1);
            if next.is_none() {
                tracing::warn!("Ignoring result row with out-of-range index {}", index);
            }
            next
        })
        .max()
        .unwrap_or(FIRST_INDEX)
}

/// Parses every complete row out of raw result store content
///
/// A last line without a terminating newline was cut off mid-write and is
/// dropped even if its fields happen to parse. Rows with missing fields,
/// a non-numeric index or unknown status values are skipped.
pub fn scan_rows(content: &[u8]) -> Vec<EntityResult> {
    let complete = match content.iter().rposition(|&b| b == b'\n') {
        Some(last_newline) => &content[..=last_newline],
        None => &[][..],
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(complete);

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<EntityResult>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!("Ignoring unreadable result row {}: {}", line + 1, e),
        }
    }
    rows
}

/// Computes the resume point straight from raw result store content
///
/// # Example
///
/// ```
/// use sumi_scout::storage::resume_from;
///
/// let content = b"Index,Charity Name,Website Status,Website URL,Contact Email Status,Contact Email\n\
/// 0,A,Not Found,,Not Found,\n\
/// 1,B,Found,https://b.org,Not Found,\n\
/// 2,C,Fou";
/// assert_eq!(resume_from(content), 2);
/// ```
pub fn resume_from(content: &[u8]) -> usize {
    next_index(scan_rows(content).iter().map(|r| r.index))
}

/// Reads the whole store from `reader` and computes the resume point
pub fn resume_from_reader<R: Read>(mut reader: R) -> std::io::Result<usize> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    Ok(resume_from(&content))
}
