//! Error types for flvsync-media.

use std::io;
use thiserror::Error;

/// Result type for flvsync-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for flvsync-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the `FLV` signature.
    #[error("Not a valid FLV stream: signature {found:02x?}")]
    InvalidSignature { found: Vec<u8> },

    /// Malformed AMF0 script data.
    #[error("Invalid AMF data at offset {offset}: {reason}")]
    InvalidAmf { offset: usize, reason: String },

    /// AMF0 marker this codec does not model.
    #[error("Unsupported AMF marker 0x{marker:02x} at offset {offset}")]
    UnsupportedMarker { marker: u8, offset: usize },

    /// A script event lacks a field the caller requires.
    #[error("Script event '{event}' is missing field '{field}'")]
    MissingField { event: String, field: &'static str },

    /// A script event field has the wrong value type.
    #[error("Script event '{event}' field '{field}' is not a {expected}")]
    FieldType {
        event: String,
        field: &'static str,
        expected: &'static str,
    },

    /// Payload too large for the 24-bit tag length field.
    #[error("Tag payload of {0} bytes exceeds the 24-bit length field")]
    PayloadTooLarge(usize),
}

impl Error {
    /// Create an invalid AMF error.
    pub fn invalid_amf(offset: usize, reason: impl Into<String>) -> Self {
        Self::InvalidAmf {
            offset,
            reason: reason.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(event: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            event: event.into(),
            field,
        }
    }

    /// Create a field type error.
    pub fn field_type(event: impl Into<String>, field: &'static str, expected: &'static str) -> Self {
        Self::FieldType {
            event: event.into(),
            field,
            expected,
        }
    }
}
