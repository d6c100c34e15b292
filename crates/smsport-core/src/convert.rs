//! Document-level entry points for both conversion directions.

use serde::Serialize;
use tracing::info;

use crate::android::{self, Backup};
use crate::assembler::BackupAssembler;
use crate::error::ConvertError;
use crate::sms;
use crate::wp;
use crate::xml::Element;

/// Convert a WP SMS document and a WP MMS document into one Android backup.
pub fn convert_to_android(
    sms_doc: &Element,
    mms_doc: &Element,
    assembler: &BackupAssembler,
) -> Result<Backup, ConvertError> {
    let sms = wp::read_messages(sms_doc)?;
    let mms = wp::read_messages(mms_doc)?;
    assembler.assemble(&sms, &mms)
}

/// Convert a single WP document holding both kinds of message.
///
/// Messages with attachments become `mms` records, the rest `sms`.
pub fn convert_mixed_to_android(
    doc: &Element,
    assembler: &BackupAssembler,
) -> Result<Backup, ConvertError> {
    let (sms, mms) = wp::partition_by_attachments(wp::read_messages(doc)?);
    assembler.assemble(&sms, &mms)
}

/// Convert the `sms` records of an Android backup into a WP document.
///
/// `mms` records are not converted back, and fanned-out recipients are not
/// regrouped: each `sms` becomes its own WP message.
pub fn convert_to_wp(android_doc: &Element) -> Result<(Element, ConversionReport), ConvertError> {
    let messages = android::read_sms_records(android_doc)?
        .iter()
        .map(sms::to_wp)
        .collect::<Result<Vec<_>, _>>()?;
    info!(messages = messages.len(), "converted Android SMS to WP");
    let report = ConversionReport {
        direction: Direction::ToWp,
        sms: messages.len(),
        mms: 0,
        count: messages.len(),
        backup_set: None,
    };
    Ok((wp::write_messages(&messages), report))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    ToAndroid,
    ToWp,
}

/// Summary of a finished conversion, for CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub direction: Direction,
    pub sms: usize,
    pub mms: usize,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_set: Option<String>,
}

impl From<&Backup> for ConversionReport {
    fn from(backup: &Backup) -> Self {
        Self {
            direction: Direction::ToAndroid,
            sms: backup.sms_count(),
            mms: backup.mms_count(),
            count: backup.count(),
            backup_set: Some(backup.backup_set.clone()),
        }
    }
}
