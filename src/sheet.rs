//! CSV codec for bulk import and export.
//!
//! Decoding produces create payloads for the access layer; encoding writes
//! full records. Column order on import is free, but the header row must
//! name every non-id field.

use crate::entity::Entity;
use crate::error::AppError;

/// Decode CSV bytes into create payloads.
///
/// The header row must contain a column for every non-id field; missing
/// columns are reported together. Extra columns (including `id`) are
/// ignored. A row whose cells fail typed deserialization fails the whole
/// import before anything is inserted.
pub fn read_payloads<E: Entity>(bytes: &[u8]) -> Result<Vec<E::Create>, AppError> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let headers = rdr.headers()?.clone();

    let missing: Vec<&str> = E::FIELDS
        .iter()
        .filter(|f| f.name != E::ID)
        .map(|f| f.name)
        .filter(|name| !headers.iter().any(|h| h == *name))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "sheet missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut payloads = Vec::new();
    for row in rdr.deserialize::<E::Create>() {
        payloads.push(row?);
    }
    Ok(payloads)
}

/// Encode records as CSV with a header row.
pub fn write_records<E: Entity>(records: &[E]) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))
}
