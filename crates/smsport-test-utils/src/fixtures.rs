//! XML document fixtures for both backup schemas.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use xml::escape::{escape_str_attribute, escape_str_pcdata};

/// Ticks at 2017-07-29 18:49:28 UTC.
pub const SAMPLE_TICKS: i64 = 131_458_277_680_000_000;

/// Base64 of `text` encoded as UTF-16LE, the way WP stores text attachments.
pub fn utf16_base64(text: &str) -> String {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    STANDARD.encode(bytes)
}

/// Base64 of raw bytes.
pub fn bytes_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Builder for one WP `Message` element.
///
/// # Example
///
/// ```ignore
/// let doc = wp_document(&[
///     WpMessageBuilder::incoming("+15550001").body("hi"),
///     WpMessageBuilder::outgoing(&["+1", "+2"]).read(false),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct WpMessageBuilder {
    incoming: bool,
    read: bool,
    timestamp: i64,
    sender: Option<String>,
    recipients: Option<Vec<String>>,
    body: String,
    attachments: Vec<(String, String)>,
}

impl WpMessageBuilder {
    pub fn incoming(sender: &str) -> Self {
        Self {
            incoming: true,
            read: true,
            timestamp: SAMPLE_TICKS,
            sender: Some(sender.to_string()),
            recipients: Some(Vec::new()),
            body: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn outgoing(recipients: &[&str]) -> Self {
        Self {
            incoming: false,
            read: true,
            timestamp: SAMPLE_TICKS,
            sender: None,
            recipients: Some(recipients.iter().map(|r| r.to_string()).collect()),
            body: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn timestamp(mut self, ticks: i64) -> Self {
        self.timestamp = ticks;
        self
    }

    /// Drop the `Sender` element entirely.
    pub fn without_sender(mut self) -> Self {
        self.sender = None;
        self
    }

    /// Drop the `Recepients` element entirely.
    pub fn without_recipients(mut self) -> Self {
        self.recipients = None;
        self
    }

    pub fn attachment(mut self, content_type: &str, data_base64: &str) -> Self {
        self.attachments
            .push((content_type.to_string(), data_base64.to_string()));
        self
    }

    pub fn smil(self, markup: &str) -> Self {
        let data = utf16_base64(markup);
        self.attachment("application/smil", &data)
    }

    pub fn text_part(self, text: &str) -> Self {
        let data = utf16_base64(text);
        self.attachment("text/plain", &data)
    }

    pub fn binary_part(self, content_type: &str, bytes: &[u8]) -> Self {
        let data = bytes_base64(bytes);
        self.attachment(content_type, &data)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<Message>");
        match &self.recipients {
            Some(list) if list.is_empty() => xml.push_str("<Recepients />"),
            Some(list) => {
                xml.push_str("<Recepients>");
                for r in list {
                    xml.push_str(&format!("<string>{}</string>", escape_str_pcdata(r.as_str())));
                }
                xml.push_str("</Recepients>");
            }
            None => {}
        }
        xml.push_str(&format!("<Body>{}</Body>", escape_str_pcdata(self.body.as_str())));
        xml.push_str(&format!("<IsIncoming>{}</IsIncoming>", self.incoming));
        xml.push_str(&format!("<IsRead>{}</IsRead>", self.read));
        xml.push_str("<Attachments>");
        for (content_type, data) in &self.attachments {
            xml.push_str(&format!(
                "<MessageAttachment><AttachmentContentType>{}</AttachmentContentType>\
                 <AttachmentDataBase64String>{}</AttachmentDataBase64String></MessageAttachment>",
                escape_str_pcdata(content_type.as_str()),
                data
            ));
        }
        xml.push_str("</Attachments>");
        xml.push_str(&format!("<LocalTimestamp>{}</LocalTimestamp>", self.timestamp));
        if let Some(sender) = &self.sender {
            xml.push_str(&format!("<Sender>{}</Sender>", escape_str_pcdata(sender.as_str())));
        }
        xml.push_str("</Message>");
        xml
    }
}

/// A complete `ArrayOfMessage` document.
pub fn wp_document(messages: &[WpMessageBuilder]) -> String {
    let body: String = messages.iter().map(WpMessageBuilder::to_xml).collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <ArrayOfMessage xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">{body}</ArrayOfMessage>"
    )
}

/// One Android `sms` element with the attributes the reverse path reads.
pub fn android_sms(sms_type: i64, address: &str, date_sent: i64, body: &str, read: bool) -> String {
    format!(
        "<sms protocol=\"0\" address=\"{}\" date=\"{date_sent}\" type=\"{sms_type}\" \
         subject=\"null\" body=\"{}\" toa=\"null\" sc_toa=\"null\" service_center=\"null\" \
         read=\"{}\" status=\"-1\" locked=\"0\" date_sent=\"{date_sent}\" />",
        escape_str_attribute(address),
        escape_str_attribute(body),
        u8::from(read)
    )
}

/// A complete `smses` document from pre-rendered records.
pub fn android_document(records: &[String]) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>\n<smses count=\"{}\">{}</smses>",
        records.len(),
        records.concat()
    )
}
