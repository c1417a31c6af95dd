//! Converts raw result rows into the text fields written to the export file.
//!
//! NULL becomes an empty field; there is no explicit null marker. Text is
//! passed through exactly as the driver produced it and binary columns are
//! Base64 encoded. No further type-specific formatting is applied.

use crate::domain::entities::FieldValue;
use base64::{engine::general_purpose, Engine as _};

/// Renders a single value.
pub fn field_to_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::Binary(b) => general_purpose::STANDARD.encode(b),
    }
}

/// Renders a whole row, keeping column order and count.
pub fn serialize_row(row: &[FieldValue]) -> Vec<String> {
    row.iter().map(field_to_text).collect()
}
