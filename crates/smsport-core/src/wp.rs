//! WP backup schema: `ArrayOfMessage` documents.
//!
//! One `Message` element per SMS or MMS, timestamped in Windows ticks. The
//! recipient container is spelled `Recepients` in every document this format
//! has ever produced, and that spelling is part of the schema.

use tracing::debug;

use crate::error::ConvertError;
use crate::xml::Element;

pub const ROOT: &str = "ArrayOfMessage";
pub const MESSAGE: &str = "Message";
pub const RECIPIENTS: &str = "Recepients";
pub const RECIPIENT: &str = "string";
pub const BODY: &str = "Body";
pub const IS_INCOMING: &str = "IsIncoming";
pub const IS_READ: &str = "IsRead";
pub const ATTACHMENTS: &str = "Attachments";
pub const ATTACHMENT: &str = "MessageAttachment";
pub const CONTENT_TYPE: &str = "AttachmentContentType";
pub const DATA: &str = "AttachmentDataBase64String";
pub const LOCAL_TIMESTAMP: &str = "LocalTimestamp";
pub const SENDER: &str = "Sender";

pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// A message as stored in a WP backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WpMessage {
    /// 100 ns ticks since 1601-01-01 UTC.
    pub local_timestamp: i64,
    pub is_incoming: bool,
    pub is_read: bool,
    /// Remote party for incoming messages; empty for outgoing.
    pub sender: String,
    /// Remote parties for outgoing messages.
    pub recipients: Vec<String>,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl WpMessage {
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// One MMS attachment: a MIME type and its base64 payload.
///
/// `application/smil` and `text/plain` payloads encode UTF-16LE text; every
/// other content type carries raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub content_type: String,
    pub data_base64: String,
}

impl Attachment {
    pub fn new(content_type: impl Into<String>, data_base64: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            data_base64: data_base64.into(),
        }
    }
}

/// Read every `Message` of an `ArrayOfMessage` document.
pub fn read_messages(doc: &Element) -> Result<Vec<WpMessage>, ConvertError> {
    if doc.name != ROOT {
        return Err(ConvertError::MissingField {
            index: None,
            field: ROOT,
        });
    }
    let messages = doc
        .children_named(MESSAGE)
        .enumerate()
        .map(|(index, element)| read_message(index, element))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(count = messages.len(), "read WP messages");
    Ok(messages)
}

fn read_message(index: usize, element: &Element) -> Result<WpMessage, ConvertError> {
    let field = |name: &'static str| {
        element
            .child(name)
            .map(Element::text)
            .ok_or_else(|| ConvertError::missing(index, name))
    };

    let raw_timestamp = field(LOCAL_TIMESTAMP)?;
    let local_timestamp = raw_timestamp
        .trim()
        .parse::<i64>()
        .map_err(|_| ConvertError::invalid(index, LOCAL_TIMESTAMP, raw_timestamp))?;
    let is_incoming = parse_bool(index, IS_INCOMING, field(IS_INCOMING)?)?;
    let is_read = parse_bool(index, IS_READ, field(IS_READ)?)?;
    let body = field(BODY)?.to_string();

    let sender = if is_incoming {
        field(SENDER)?.to_string()
    } else {
        element.child(SENDER).map(|s| s.text.clone()).unwrap_or_default()
    };

    let recipients = match element.child(RECIPIENTS) {
        Some(list) => list
            .children_named(RECIPIENT)
            .map(|r| r.text.clone())
            .collect(),
        None if is_incoming => Vec::new(),
        None => return Err(ConvertError::missing(index, RECIPIENTS)),
    };

    let attachments = match element.child(ATTACHMENTS) {
        Some(list) => list
            .children_named(ATTACHMENT)
            .map(|a| read_attachment(index, a))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(WpMessage {
        local_timestamp,
        is_incoming,
        is_read,
        sender,
        recipients,
        body,
        attachments,
    })
}

fn read_attachment(index: usize, element: &Element) -> Result<Attachment, ConvertError> {
    let content_type = element
        .child(CONTENT_TYPE)
        .ok_or_else(|| ConvertError::missing(index, CONTENT_TYPE))?;
    let data = element
        .child(DATA)
        .ok_or_else(|| ConvertError::missing(index, DATA))?;
    Ok(Attachment::new(content_type.text.trim(), data.text.clone()))
}

/// Booleans are `true`/`false` in any case, surrounded by optional whitespace.
fn parse_bool(index: usize, field: &'static str, raw: &str) -> Result<bool, ConvertError> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConvertError::invalid(index, field, raw))
    }
}

/// Build an `ArrayOfMessage` document.
pub fn write_messages(messages: &[WpMessage]) -> Element {
    let mut root = Element::new(ROOT)
        .with_attr("xmlns:xsd", XSD_NAMESPACE)
        .with_attr("xmlns:xsi", XSI_NAMESPACE);
    for message in messages {
        root.push_child(message_element(message));
    }
    root
}

fn message_element(message: &WpMessage) -> Element {
    let recipients = message
        .recipients
        .iter()
        .fold(Element::new(RECIPIENTS), |list, r| {
            list.with_child(Element::new(RECIPIENT).with_text(r.as_str()))
        });
    let attachments = message
        .attachments
        .iter()
        .fold(Element::new(ATTACHMENTS), |list, a| {
            list.with_child(
                Element::new(ATTACHMENT)
                    .with_child(Element::new(CONTENT_TYPE).with_text(a.content_type.as_str()))
                    .with_child(Element::new(DATA).with_text(a.data_base64.as_str())),
            )
        });

    Element::new(MESSAGE)
        .with_child(recipients)
        .with_child(Element::new(BODY).with_text(message.body.as_str()))
        .with_child(Element::new(IS_INCOMING).with_text(message.is_incoming.to_string()))
        .with_child(Element::new(IS_READ).with_text(message.is_read.to_string()))
        .with_child(attachments)
        .with_child(Element::new(LOCAL_TIMESTAMP).with_text(message.local_timestamp.to_string()))
        .with_child(Element::new(SENDER).with_text(message.sender.as_str()))
}

/// Split a mixed document into `(sms, mms)` by whether a message has attachments.
pub fn partition_by_attachments(messages: Vec<WpMessage>) -> (Vec<WpMessage>, Vec<WpMessage>) {
    let (mms, sms): (Vec<_>, Vec<_>) = messages.into_iter().partition(WpMessage::has_attachments);
    (sms, mms)
}
