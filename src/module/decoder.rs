//! Decoder for concatenated module record streams
//!
//! `go list -m -json` prints one JSON object per module back to back, with no
//! enclosing array and no separator. Records are read as successive top-level
//! values from the byte stream, so braces inside string values never split a
//! record.

use serde_json::Deserializer;

use crate::module::error::QueryError;
use crate::module::types::ModuleRecord;

/// Decode every record of a raw `go list` stream
///
/// Fails on the first structurally invalid or truncated record; nothing
/// decoded before the failure is returned.
pub fn decode_records(raw: &[u8]) -> Result<Vec<ModuleRecord>, QueryError> {
    Deserializer::from_slice(raw)
        .into_iter::<ModuleRecord>()
        .map(|record| record.map_err(QueryError::from))
        .collect()
}
