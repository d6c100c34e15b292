//! Android backup schema: the `smses` document.
//!
//! Constant attributes of `sms`, `mms`, and `part` live in the static
//! templates below. Rendering merges a template with the computed fields and
//! emits attributes in byte-wise sorted order, which is the order Android
//! backup tools write them in.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::ConvertError;
use crate::xml::Element;

pub const ROOT: &str = "smses";

/// Placeholder Android uses for "this device" in an MMS address list.
pub const SELF_ADDRESS_TOKEN: &str = "insert-address-token";

/// Charset code for UTF-8 in MMS parts and addresses.
pub const CHARSET_UTF8: u32 = 106;

pub const SMS_TEMPLATE: &[(&str, &str)] = &[
    ("contact_name", "(Unknown)"),
    ("locked", "0"),
    ("protocol", "0"),
    ("sc_toa", "null"),
    ("service_center", "null"),
    ("subject", "null"),
    ("toa", "null"),
];

pub const MMS_TEMPLATE: &[(&str, &str)] = &[
    ("contact_name", "(Unknown)"),
    ("ct_cls", "null"),
    ("ct_l", "null"),
    ("ct_t", "application/vnd.wap.multipart.related"),
    ("d_rpt", "128"),
    ("d_tm", "null"),
    ("date_sent", "0"),
    ("exp", "null"),
    ("locked", "0"),
    ("m_cls", "0"),
    ("m_type", "132"),
    ("msg_box", "1"),
    ("pri", "129"),
    ("read_status", "null"),
    ("resp_st", "null"),
    ("resp_txt", "null"),
    ("retr_st", "null"),
    ("retr_txt", "null"),
    ("retr_txt_cs", "null"),
    ("rpt_a", "null"),
    ("rr", "129"),
    ("st", "null"),
    ("sub", "null"),
    ("sub_cs", "null"),
    ("sub_id", "null"),
    ("text_only", "null"),
    ("v", "18"),
];

pub const PART_TEMPLATE: &[(&str, &str)] = &[
    ("cd", "null"),
    ("chset", "null"),
    ("cid", "null"),
    ("ctt_s", "null"),
    ("ctt_t", "null"),
    ("fn", "null"),
    ("name", "null"),
    ("text", "null"),
];

fn merge(template: &[(&'static str, &'static str)], computed: Vec<(&'static str, String)>) -> Element {
    let mut merged: BTreeMap<&'static str, String> = template
        .iter()
        .map(|&(key, value)| (key, value.to_string()))
        .collect();
    merged.extend(computed);
    Element {
        attributes: merged
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
        ..Element::default()
    }
}

fn flag(value: bool) -> String {
    let digit = if value { "1" } else { "0" };
    digit.to_string()
}

/// Android SMS box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsType {
    Inbox,
    Sent,
}

impl SmsType {
    pub fn code(self) -> i64 {
        match self {
            SmsType::Inbox => 1,
            SmsType::Sent => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(SmsType::Inbox),
            2 => Some(SmsType::Sent),
            _ => None,
        }
    }

    /// Android status column: -1 for none/received, 0 for complete/sent.
    pub fn status(self) -> i64 {
        match self {
            SmsType::Inbox => -1,
            SmsType::Sent => 0,
        }
    }
}

/// An `sms` record produced by the forward conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidSms {
    pub address: String,
    pub body: String,
    /// Milliseconds since the Unix epoch; also written as `date_sent`.
    pub date: i64,
    pub read: bool,
    pub sms_type: SmsType,
    pub readable_date: String,
}

impl AndroidSms {
    pub fn to_element(&self) -> Element {
        let mut element = merge(
            SMS_TEMPLATE,
            vec![
                ("address", self.address.clone()),
                ("body", self.body.clone()),
                ("date", self.date.to_string()),
                ("date_sent", self.date.to_string()),
                ("read", flag(self.read)),
                ("readable_date", self.readable_date.clone()),
                ("status", self.sms_type.status().to_string()),
                ("type", self.sms_type.code().to_string()),
            ],
        );
        element.name = "sms".to_string();
        element
    }
}

/// Role of an MMS address entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrRole {
    From,
    To,
}

impl AddrRole {
    pub fn code(self) -> u32 {
        match self {
            AddrRole::From => 137,
            AddrRole::To => 151,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidAddr {
    pub address: String,
    pub role: AddrRole,
}

impl AndroidAddr {
    pub fn new(address: impl Into<String>, role: AddrRole) -> Self {
        Self {
            address: address.into(),
            role,
        }
    }

    pub fn to_element(&self) -> Element {
        Element::new("addr")
            .with_attr("address", self.address.as_str())
            .with_attr("type", self.role.code().to_string())
            .with_attr("charset", CHARSET_UTF8.to_string())
    }
}

/// Payload of an MMS part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartContent {
    /// Slide layout; excluded from `m_size`.
    Smil(String),
    /// Decoded text, UTF-8 charset.
    Text(String),
    /// Base64 payload copied verbatim from the source attachment.
    Binary(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidPart {
    /// File-name-like label (`Text01.txt`, `Image02.txt`, `01smil`).
    pub cl: String,
    pub content_type: String,
    pub content: PartContent,
}

impl AndroidPart {
    pub fn seq(&self) -> i32 {
        match self.content {
            PartContent::Smil(_) => -1,
            _ => 0,
        }
    }

    pub fn to_element(&self) -> Element {
        let mut computed = vec![
            ("cl", self.cl.clone()),
            ("ct", self.content_type.clone()),
            ("seq", self.seq().to_string()),
        ];
        match &self.content {
            PartContent::Smil(text) => computed.push(("text", text.clone())),
            PartContent::Text(text) => {
                computed.push(("chset", CHARSET_UTF8.to_string()));
                computed.push(("text", text.clone()));
            }
            PartContent::Binary(data) => computed.push(("data", data.clone())),
        }
        let mut element = merge(PART_TEMPLATE, computed);
        element.name = "part".to_string();
        element
    }
}

/// An `mms` record with its parts and addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidMms {
    /// Sender for incoming, `~`-joined recipients for outgoing.
    pub address: String,
    /// Present only when the source message has a non-blank body.
    pub body: Option<String>,
    pub date: i64,
    pub read: bool,
    pub readable_date: String,
    pub m_id: String,
    pub tr_id: String,
    /// Bytes of all non-SMIL parts.
    pub m_size: u64,
    pub parts: Vec<AndroidPart>,
    pub addrs: Vec<AndroidAddr>,
}

impl AndroidMms {
    pub fn to_element(&self) -> Element {
        let mut computed = vec![
            ("address", self.address.clone()),
            ("date", self.date.to_string()),
            ("m_id", self.m_id.clone()),
            ("m_size", self.m_size.to_string()),
            ("read", flag(self.read)),
            ("readable_date", self.readable_date.clone()),
            ("seen", flag(self.read)),
            ("tr_id", self.tr_id.clone()),
        ];
        if let Some(body) = &self.body {
            computed.push(("body", body.clone()));
        }
        let mut element = merge(MMS_TEMPLATE, computed);
        element.name = "mms".to_string();

        let parts = self
            .parts
            .iter()
            .fold(Element::new("parts"), |parts, p| parts.with_child(p.to_element()));
        let addrs = self
            .addrs
            .iter()
            .fold(Element::new("addrs"), |addrs, a| addrs.with_child(a.to_element()));
        element.with_child(parts).with_child(addrs)
    }
}

/// A child of the `smses` root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Sms(AndroidSms),
    Mms(AndroidMms),
}

impl Record {
    pub fn to_element(&self) -> Element {
        match self {
            Record::Sms(sms) => sms.to_element(),
            Record::Mms(mms) => mms.to_element(),
        }
    }
}

/// A complete Android backup ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// Milliseconds since the Unix epoch at which the backup was produced.
    pub backup_date: i64,
    /// Unique identifier of this backup run.
    pub backup_set: String,
    pub records: Vec<Record>,
}

impl Backup {
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn sms_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, Record::Sms(_)))
            .count()
    }

    pub fn mms_count(&self) -> usize {
        self.count() - self.sms_count()
    }

    pub fn to_element(&self) -> Element {
        let root = Element::new(ROOT)
            .with_attr("backup_date", self.backup_date.to_string())
            .with_attr("backup_set", self.backup_set.as_str())
            .with_attr("count", self.count().to_string());
        self.records
            .iter()
            .fold(root, |root, r| root.with_child(r.to_element()))
    }
}

/// An `sms` record as read from an existing Android backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidSmsRecord {
    pub address: String,
    pub body: String,
    pub date_sent: i64,
    pub read: bool,
    pub sms_type: SmsType,
}

/// Read all `sms` children of a `smses` document. `mms` children are skipped.
///
/// The `type` column is checked before any other attribute, so drafts and
/// other unsupported boxes fail as `InvalidFormat` whatever else they lack.
pub fn read_sms_records(doc: &Element) -> Result<Vec<AndroidSmsRecord>, ConvertError> {
    if doc.name != ROOT {
        return Err(ConvertError::MissingField {
            index: None,
            field: ROOT,
        });
    }
    let skipped = doc.children_named("mms").count();
    if skipped > 0 {
        debug!(skipped, "ignoring mms records in reverse conversion");
    }
    doc.children_named("sms")
        .enumerate()
        .map(|(index, sms)| read_sms_record(index, sms))
        .collect()
}

fn read_sms_record(index: usize, sms: &Element) -> Result<AndroidSmsRecord, ConvertError> {
    let attr = |name: &'static str| sms.attr(name).ok_or_else(|| ConvertError::missing(index, name));
    let number = |name: &'static str| -> Result<i64, ConvertError> {
        let raw = attr(name)?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ConvertError::invalid(index, name, raw))
    };

    let type_code = number("type")?;
    let sms_type = SmsType::from_code(type_code).ok_or(ConvertError::InvalidFormat {
        index,
        sms_type: type_code,
    })?;

    Ok(AndroidSmsRecord {
        sms_type,
        address: attr("address")?.to_string(),
        body: attr("body")?.to_string(),
        read: number("read")? != 0,
        date_sent: number("date_sent")?,
    })
}
