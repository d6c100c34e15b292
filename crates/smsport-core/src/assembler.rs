//! Backup assembly: the forward conversion driver.
//!
//! A [`BackupAssembler`] owns the single [`RunStamp`] of a conversion run and
//! the running record count. SMS messages are mapped first, then MMS; every
//! appended record advances the count that numbers `m_id`/`tr_id` and ends up
//! as the root `count`.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use tracing::info;
use uuid::Uuid;

use smsport_config::{AppConfig, Timezone, default_readable_date_format};

use crate::android::{Backup, Record};
use crate::epoch;
use crate::error::ConvertError;
use crate::mms::map_mms;
use crate::sms::SmsMapper;
use crate::wp::WpMessage;

/// Pattern of the run stamp embedded in `m_id` and output file names.
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// How human-readable timestamps are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerOptions {
    pub readable_date_format: String,
    pub timezone: Timezone,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            readable_date_format: default_readable_date_format(),
            timezone: Timezone::Utc,
        }
    }
}

impl From<&AppConfig> for AssemblerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            readable_date_format: config.output.readable_date_format.clone(),
            timezone: config.output.timezone,
        }
    }
}

impl AssemblerOptions {
    /// Render an instant with `pattern` in the configured timezone.
    pub fn format_instant(&self, at: DateTime<Utc>, pattern: &str) -> Result<String, ConvertError> {
        let mut out = String::new();
        let written = match self.timezone {
            Timezone::Utc => write!(out, "{}", at.format(pattern)),
            Timezone::Local => write!(out, "{}", at.with_timezone(&Local).format(pattern)),
        };
        written.map_err(|_| ConvertError::DateFormat(pattern.to_string()))?;
        Ok(out)
    }

    /// The `readable_date` attribute for an Android millisecond timestamp.
    pub fn readable_date(&self, ms: i64) -> Result<String, ConvertError> {
        let at = DateTime::<Utc>::from_timestamp_millis(ms)
            .ok_or(ConvertError::TimestampOutOfRange { ms })?;
        self.format_instant(at, &self.readable_date_format)
    }
}

/// Identity of one conversion run, shared by every record it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStamp {
    pub at: DateTime<Utc>,
    pub backup_set: Uuid,
}

impl RunStamp {
    pub fn new(at: DateTime<Utc>, backup_set: Uuid) -> Self {
        Self { at, backup_set }
    }

    /// A stamp for the current instant with a fresh random backup set.
    pub fn now() -> Self {
        Self::new(Utc::now(), Uuid::new_v4())
    }

    pub fn backup_date(&self) -> i64 {
        epoch::datetime_to_android(self.at)
    }

    /// `yyyyMMddHHmmss` in the configured timezone.
    pub fn message_stamp(&self, options: &AssemblerOptions) -> Result<String, ConvertError> {
        options.format_instant(self.at, RUN_STAMP_FORMAT)
    }
}

#[derive(Debug, Clone)]
pub struct BackupAssembler {
    options: AssemblerOptions,
    stamp: RunStamp,
}

impl BackupAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self::with_stamp(options, RunStamp::now())
    }

    pub fn with_stamp(options: AssemblerOptions, stamp: RunStamp) -> Self {
        Self { options, stamp }
    }

    pub fn stamp(&self) -> &RunStamp {
        &self.stamp
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Convert the SMS-only messages, then the MMS messages, into one backup.
    ///
    /// Fails on the first unconvertible message; no partial backup is returned.
    pub fn assemble(&self, sms: &[WpMessage], mms: &[WpMessage]) -> Result<Backup, ConvertError> {
        let mut records = Vec::with_capacity(sms.len() + mms.len());

        let mapper = SmsMapper::new(&self.options);
        for (index, message) in sms.iter().enumerate() {
            records.extend(mapper.to_android(index, message)?.into_iter().map(Record::Sms));
        }
        let sms_records = records.len();

        for (index, message) in mms.iter().enumerate() {
            let record = map_mms(index, records.len(), message, &self.options, &self.stamp)?;
            records.push(Record::Mms(record));
        }

        info!(
            backup_set = %self.stamp.backup_set,
            sms = sms_records,
            mms = records.len() - sms_records,
            "assembled Android backup"
        );

        Ok(Backup {
            backup_date: self.stamp.backup_date(),
            backup_set: self.stamp.backup_set.to_string(),
            records,
        })
    }
}
