//! Conversion errors.
//!
//! Every variant that originates in a message carries the 0-based index of
//! that message within its input document, so a failed conversion can be
//! traced back to the offending record.

/// Errors raised while reading, mapping, or writing backup documents.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A required element or attribute is absent.
    #[error("{} is missing required field `{field}`", at(.index))]
    MissingField {
        index: Option<usize>,
        field: &'static str,
    },

    /// A field is present but its text could not be parsed.
    #[error("{} has invalid `{field}` value {value:?}", at(.index))]
    InvalidValue {
        index: Option<usize>,
        field: &'static str,
        value: String,
    },

    /// An Android `sms` record uses a type other than inbox (1) or sent (2).
    #[error("message {index} has unsupported sms type {sms_type} (expected 1 or 2)")]
    InvalidFormat { index: usize, sms_type: i64 },

    /// An attachment payload failed base64 or UTF-16 decoding.
    #[error("message {index} attachment {attachment}: {reason}")]
    Encoding {
        index: usize,
        attachment: usize,
        reason: String,
    },

    /// A millisecond timestamp lies outside the representable calendar range.
    #[error("timestamp {ms} ms is outside the representable date range")]
    TimestampOutOfRange { ms: i64 },

    /// A `readable_date` pattern could not be rendered.
    #[error("invalid readable date format {0:?}")]
    DateFormat(String),

    /// The document structure is broken beyond what the XML parser reports.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    XmlRead(#[from] xml::reader::Error),

    #[error("failed to write XML: {0}")]
    XmlWrite(#[from] xml::writer::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn at(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("message {i}"),
        None => "document".to_string(),
    }
}

impl ConvertError {
    pub(crate) fn missing(index: usize, field: &'static str) -> Self {
        Self::MissingField {
            index: Some(index),
            field,
        }
    }

    pub(crate) fn invalid(index: usize, field: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            index: Some(index),
            field,
            value: value.to_string(),
        }
    }
}
