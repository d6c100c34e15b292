//! WP message to Android `mms` record mapping.
//!
//! Combines [`addrs::build_addresses`] and [`parts::MmsPartBuilder`] with the
//! per-run identifiers handed out by the assembler.

/// `addrs` derivation with self-address placeholders.
pub mod addrs;
/// Attachment decoding and `m_size` bookkeeping.
pub mod parts;

pub use addrs::{MmsAddresses, build_addresses};
pub use parts::{MmsPartBuilder, MmsParts};

use tracing::debug;

use crate::android::AndroidMms;
use crate::assembler::{AssemblerOptions, RunStamp};
use crate::epoch;
use crate::error::ConvertError;
use crate::wp::WpMessage;

/// Map one WP message to an `mms` record.
///
/// `message_index` locates the message in its input document; `record_index`
/// is its 0-based position among all records of the backup and feeds `m_id`
/// and `tr_id`.
pub fn map_mms(
    message_index: usize,
    record_index: usize,
    message: &WpMessage,
    options: &AssemblerOptions,
    stamp: &RunStamp,
) -> Result<AndroidMms, ConvertError> {
    let date = epoch::wp_to_android(message.local_timestamp);
    let MmsAddresses { address, addrs } = build_addresses(message);
    let MmsParts { parts, m_size } = MmsPartBuilder::build(message_index, &message.attachments)?;
    let body = (!message.body.trim().is_empty()).then(|| message.body.clone());

    debug!(
        message = message_index,
        record = record_index,
        parts = parts.len(),
        m_size,
        "mapped MMS"
    );

    Ok(AndroidMms {
        address,
        body,
        date,
        read: message.is_read,
        readable_date: options.readable_date(date)?,
        m_id: format!("msg{record_index:05}-{}@localhost", stamp.message_stamp(options)?),
        tr_id: format!("id1_{record_index:05}"),
        m_size,
        parts,
        addrs,
    })
}
