#![deny(unsafe_code)]

//! smsport core conversion library.
//!
//! Maps messaging backups between the WP `ArrayOfMessage` schema and the
//! Android `smses` schema. Conversion is synchronous and all-or-nothing:
//! documents are read into [`xml::Element`] trees, mapped message by
//! message, and rendered only once every message has converted.

/// Android `smses` records, attribute templates, and the `sms` reader.
pub mod android;
/// Forward conversion driver and run-wide identifiers.
pub mod assembler;
/// Document-level conversion entry points.
pub mod convert;
/// WP tick / Android millisecond translation.
pub mod epoch;
/// Conversion error type.
pub mod error;
/// WP message to Android `mms` mapping.
pub mod mms;
/// Plain-text message mapping in both directions.
pub mod sms;
/// WP `ArrayOfMessage` reading and writing.
pub mod wp;
/// Owned XML element tree.
pub mod xml;

pub use android::Backup;
pub use assembler::{AssemblerOptions, BackupAssembler, RunStamp};
pub use convert::{ConversionReport, convert_mixed_to_android, convert_to_android, convert_to_wp};
pub use error::ConvertError;
pub use sms::SmsMapper;
pub use wp::WpMessage;
pub use xml::Element;
