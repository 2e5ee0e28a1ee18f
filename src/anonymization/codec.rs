//! JSON record codec
//!
//! Decodes raw message bytes into a [`Record`] and encodes it back after
//! redaction. Any well-formed JSON object is accepted; fields are kept in
//! their original order so untouched data round-trips.

use super::record::{Record, DATA_SECTION};
use crate::domain::errors::{DecodeError, EncodeError};
use serde_json::Value;

/// Decode a JSON object payload
///
/// # Errors
///
/// - [`DecodeError::Malformed`] if the payload is not valid JSON
/// - [`DecodeError::NotAnObject`] if it is valid JSON but not an object
pub fn decode(bytes: &[u8]) -> Result<Record, DecodeError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    Record::try_from(value)
}

/// Decode a payload that must carry a `data` object
///
/// Used for topics whose policy has rules to apply.
pub fn decode_with_data(bytes: &[u8]) -> Result<Record, DecodeError> {
    let record = decode(bytes)?;
    if !record.has_data() {
        return Err(DecodeError::MissingSection(DATA_SECTION.to_string()));
    }
    Ok(record)
}

/// Encode a record as compact JSON
///
/// # Errors
///
/// Only fails for values that cannot be serialized, which decoded records
/// never contain.
pub fn encode(record: &Record) -> Result<Vec<u8>, EncodeError> {
    serde_json::to_vec(record.as_map()).map_err(|e| EncodeError(e.to_string()))
}
