//! Attachment decoding into Android MMS parts.
//!
//! [`MmsPartBuilder`] scans a message's attachments in order and accumulates
//! the parts together with the totals that are only known once every
//! attachment has been seen: `m_size` and the binary-part count encoded in
//! the SMIL label. [`MmsPartBuilder::finish`] applies those totals once.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use crate::android::{AndroidPart, PartContent};
use crate::error::ConvertError;
use crate::wp::Attachment;

pub const SMIL_CONTENT_TYPE: &str = "application/smil";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Parts of one MMS plus the derived size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MmsParts {
    pub parts: Vec<AndroidPart>,
    /// UTF-8 bytes of text parts plus raw bytes of binary parts.
    pub m_size: u64,
}

#[derive(Debug)]
pub struct MmsPartBuilder {
    message_index: usize,
    parts: Vec<AndroidPart>,
    smil_slots: Vec<usize>,
    /// 1-based position of the current attachment, SMIL included.
    ordinal: usize,
    binary_count: usize,
    m_size: u64,
}

impl MmsPartBuilder {
    /// `message_index` is only used to give errors context.
    pub fn new(message_index: usize) -> Self {
        Self {
            message_index,
            parts: Vec::new(),
            smil_slots: Vec::new(),
            ordinal: 0,
            binary_count: 0,
            m_size: 0,
        }
    }

    pub fn push(&mut self, attachment: &Attachment) -> Result<(), ConvertError> {
        self.ordinal += 1;
        let content_type = attachment.content_type.as_str();
        let part = match content_type {
            SMIL_CONTENT_TYPE => {
                let text = self.decode_text(attachment)?;
                if !self.smil_slots.is_empty() {
                    warn!(
                        message = self.message_index,
                        attachment = self.ordinal,
                        "message carries more than one SMIL attachment"
                    );
                }
                self.smil_slots.push(self.parts.len());
                AndroidPart {
                    // Labelled in `finish` once the binary parts are counted.
                    cl: String::new(),
                    content_type: content_type.to_string(),
                    content: PartContent::Smil(text),
                }
            }
            TEXT_CONTENT_TYPE => {
                let text = self.decode_text(attachment)?;
                self.m_size += text.len() as u64;
                AndroidPart {
                    cl: format!("Text{:02}.txt", self.ordinal),
                    content_type: content_type.to_string(),
                    content: PartContent::Text(text),
                }
            }
            _ => {
                let bytes = self.decode_base64(attachment)?;
                self.m_size += bytes.len() as u64;
                self.binary_count += 1;
                AndroidPart {
                    cl: format!("Image{:02}.txt", self.ordinal),
                    content_type: content_type.to_string(),
                    content: PartContent::Binary(attachment.data_base64.clone()),
                }
            }
        };
        self.parts.push(part);
        Ok(())
    }

    pub fn finish(mut self) -> MmsParts {
        let label = format!("{:02}smil", self.binary_count);
        for slot in self.smil_slots {
            self.parts[slot].cl = label.clone();
        }
        MmsParts {
            parts: self.parts,
            m_size: self.m_size,
        }
    }

    /// Build the parts for a whole attachment list.
    pub fn build(message_index: usize, attachments: &[Attachment]) -> Result<MmsParts, ConvertError> {
        let mut builder = Self::new(message_index);
        for attachment in attachments {
            builder.push(attachment)?;
        }
        Ok(builder.finish())
    }

    fn encoding_error(&self, reason: String) -> ConvertError {
        ConvertError::Encoding {
            index: self.message_index,
            attachment: self.ordinal - 1,
            reason,
        }
    }

    fn decode_base64(&self, attachment: &Attachment) -> Result<Vec<u8>, ConvertError> {
        // Payloads are sometimes wrapped across lines.
        let compact: String = attachment
            .data_base64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact)
            .map_err(|e| self.encoding_error(format!("invalid base64: {e}")))
    }

    fn decode_text(&self, attachment: &Attachment) -> Result<String, ConvertError> {
        let bytes = self.decode_base64(attachment)?;
        decode_utf16le(&bytes).map_err(|reason| self.encoding_error(reason))
    }
}

fn decode_utf16le(bytes: &[u8]) -> Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err(format!(
            "UTF-16 payload has odd length {} bytes",
            bytes.len()
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| format!("invalid UTF-16 text: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utf16(text: &str) -> String {
        let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        STANDARD.encode(bytes)
    }

    fn binary(len: usize) -> Attachment {
        Attachment::new("image/jpeg", STANDARD.encode(vec![0xAB; len]))
    }

    #[test]
    fn test_size_counts_text_and_binary() {
        let parts = MmsPartBuilder::build(
            0,
            &[
                Attachment::new(TEXT_CONTENT_TYPE, utf16("0123456789")),
                binary(500),
            ],
        )
        .unwrap();
        assert_eq!(parts.m_size, 510);
    }

    #[test]
    fn test_text_size_is_utf8_length() {
        // Four characters, seven UTF-8 bytes.
        let parts =
            MmsPartBuilder::build(0, &[Attachment::new(TEXT_CONTENT_TYPE, utf16("añ€b"))]).unwrap();
        assert_eq!(parts.m_size, 7);
        assert_eq!(parts.parts[0].content, PartContent::Text("añ€b".to_string()));
    }

    #[test]
    fn test_smil_label_counts_binary_parts_after_it() {
        let parts = MmsPartBuilder::build(
            3,
            &[
                Attachment::new(SMIL_CONTENT_TYPE, utf16("<smil></smil>")),
                binary(4),
                binary(8),
            ],
        )
        .unwrap();
        assert_eq!(parts.parts[0].cl, "02smil");
        assert_eq!(parts.parts[0].seq(), -1);
        assert_eq!(parts.m_size, 12);
    }

    #[test]
    fn test_smil_without_binaries() {
        let parts = MmsPartBuilder::build(
            0,
            &[
                Attachment::new(SMIL_CONTENT_TYPE, utf16("<smil/>")),
                Attachment::new(TEXT_CONTENT_TYPE, utf16("hi")),
            ],
        )
        .unwrap();
        assert_eq!(parts.parts[0].cl, "00smil");
        assert_eq!(parts.m_size, 2);
    }

    #[test]
    fn test_labels_use_ordinal_over_all_attachments() {
        let parts = MmsPartBuilder::build(
            0,
            &[
                Attachment::new(SMIL_CONTENT_TYPE, utf16("<smil/>")),
                binary(1),
                Attachment::new(TEXT_CONTENT_TYPE, utf16("caption")),
                binary(1),
            ],
        )
        .unwrap();
        let labels: Vec<&str> = parts.parts.iter().map(|p| p.cl.as_str()).collect();
        assert_eq!(labels, vec!["02smil", "Image02.txt", "Text03.txt", "Image04.txt"]);
    }

    #[test]
    fn test_binary_keeps_original_payload() {
        let attachment = Attachment::new("image/png", "iVBO\nRw0K");
        let parts = MmsPartBuilder::build(0, std::slice::from_ref(&attachment)).unwrap();
        assert_eq!(parts.parts[0].content, PartContent::Binary("iVBO\nRw0K".to_string()));
        assert_eq!(parts.m_size, 6);
    }

    #[test]
    fn test_invalid_base64_is_encoding_error() {
        let err = MmsPartBuilder::build(
            7,
            &[binary(1), Attachment::new("image/gif", "not base64!")],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Encoding {
                index: 7,
                attachment: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_odd_length_utf16_is_encoding_error() {
        let err =
            MmsPartBuilder::build(0, &[Attachment::new(TEXT_CONTENT_TYPE, STANDARD.encode([0x41]))])
                .unwrap_err();
        assert!(err.to_string().contains("odd length"));
    }

    #[test]
    fn test_unpaired_surrogate_is_encoding_error() {
        let err = MmsPartBuilder::build(
            0,
            &[Attachment::new(TEXT_CONTENT_TYPE, STANDARD.encode([0x00, 0xD8]))],
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Encoding { .. }));
    }
}
