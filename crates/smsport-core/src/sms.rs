//! Plain-text message mapping in both directions.
//!
//! Forward, an outgoing WP message fans out into one `sms` per recipient;
//! Android has no way to group them again, so the reverse direction yields
//! one single-recipient WP message per `sms`.

use tracing::{debug, warn};

use crate::android::{AndroidSms, AndroidSmsRecord, SmsType};
use crate::assembler::AssemblerOptions;
use crate::epoch;
use crate::error::ConvertError;
use crate::wp::WpMessage;

#[derive(Debug, Clone, Copy)]
pub struct SmsMapper<'a> {
    options: &'a AssemblerOptions,
}

impl<'a> SmsMapper<'a> {
    pub fn new(options: &'a AssemblerOptions) -> Self {
        Self { options }
    }

    /// Map a WP message to Android `sms` records.
    pub fn to_android(
        &self,
        index: usize,
        message: &WpMessage,
    ) -> Result<Vec<AndroidSms>, ConvertError> {
        let date = epoch::wp_to_android(message.local_timestamp);
        let readable_date = self.options.readable_date(date)?;
        let record = |address: &str, sms_type: SmsType| AndroidSms {
            address: address.to_string(),
            body: message.body.clone(),
            date,
            read: message.is_read,
            sms_type,
            readable_date: readable_date.clone(),
        };

        if message.is_incoming {
            return Ok(vec![record(message.sender.as_str(), SmsType::Inbox)]);
        }
        if message.recipients.is_empty() {
            warn!(message = index, "outgoing SMS has no recipients, nothing emitted");
        }
        let records: Vec<AndroidSms> = message
            .recipients
            .iter()
            .map(|r| record(r.as_str(), SmsType::Sent))
            .collect();
        debug!(message = index, records = records.len(), "mapped outgoing SMS");
        Ok(records)
    }
}

/// Map an Android `sms` back to a WP message.
///
/// Fails with `TimestampOutOfRange` when `date_sent` cannot be expressed in
/// WP ticks.
pub fn to_wp(record: &AndroidSmsRecord) -> Result<WpMessage, ConvertError> {
    let local_timestamp = epoch::checked_android_to_wp(record.date_sent)
        .ok_or(ConvertError::TimestampOutOfRange {
            ms: record.date_sent,
        })?;
    let incoming = record.sms_type == SmsType::Inbox;
    Ok(WpMessage {
        local_timestamp,
        is_incoming: incoming,
        is_read: record.read,
        sender: if incoming {
            record.address.clone()
        } else {
            String::new()
        },
        recipients: if incoming {
            Vec::new()
        } else {
            vec![record.address.clone()]
        },
        body: record.body.clone(),
        attachments: Vec::new(),
    })
}
