//! Fuzz target for WP document parsing and forward conversion.
//!
//! Run with: cargo +nightly fuzz run fuzz_wp_document
//!
//! Arbitrary input is parsed as XML, read as a WP message list and, when that
//! succeeds, assembled into an Android backup and rendered. Errors are fine;
//! panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;
use smsport_core::{AssemblerOptions, BackupAssembler, Element, convert_mixed_to_android};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = Element::parse_document(s) else {
        return;
    };
    let assembler = BackupAssembler::new(AssemblerOptions::default());
    if let Ok(backup) = convert_mixed_to_android(&doc, &assembler) {
        let _ = backup.to_element().to_document_string();
    }
});
