//! End-to-end conversion tests over complete documents.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use smsport_core::{
    AssemblerOptions, BackupAssembler, ConvertError, Element, RunStamp, convert_mixed_to_android,
    convert_to_android, convert_to_wp, wp,
};
use smsport_test_utils::fixtures::{
    SAMPLE_TICKS, WpMessageBuilder, android_document, android_sms, wp_document,
};
use smsport_test_utils::tracing_setup::init_test_tracing;

fn assembler() -> BackupAssembler {
    BackupAssembler::with_stamp(
        AssemblerOptions::default(),
        RunStamp::new(
            Utc.with_ymd_and_hms(2017, 7, 29, 18, 49, 28).unwrap(),
            Uuid::nil(),
        ),
    )
}

fn parse(xml: &str) -> Element {
    Element::parse_document(xml).unwrap()
}

fn empty_wp() -> Element {
    parse(&wp_document(&[]))
}

/// Render and re-read, so assertions see exactly what a consumer would.
fn rendered(backup: &smsport_core::Backup) -> Element {
    let text = backup.to_element().to_document_string().unwrap();
    parse(&text)
}

#[test]
fn test_incoming_sms_document() {
    init_test_tracing();
    let sms = parse(&wp_document(&[
        WpMessageBuilder::incoming("+15550001").body("hello"),
    ]));
    let backup = convert_to_android(&sms, &empty_wp(), &assembler()).unwrap();
    let root = rendered(&backup);

    assert_eq!(root.name, "smses");
    assert_eq!(root.attr("count"), Some("1"));
    assert_eq!(root.attr("backup_date"), Some("1501354168000"));
    assert_eq!(
        root.attr("backup_set"),
        Some("00000000-0000-0000-0000-000000000000")
    );

    let sms = root.child("sms").unwrap();
    assert_eq!(sms.attr("address"), Some("+15550001"));
    assert_eq!(sms.attr("body"), Some("hello"));
    assert_eq!(sms.attr("type"), Some("1"));
    assert_eq!(sms.attr("status"), Some("-1"));
    assert_eq!(sms.attr("date"), Some("1501354168000"));
    assert_eq!(sms.attr("date_sent"), Some("1501354168000"));
    assert_eq!(sms.attr("readable_date"), Some("7/29/2017 6:49:28 PM"));
    assert_eq!(sms.attr("contact_name"), Some("(Unknown)"));
    assert_eq!(sms.attr("service_center"), Some("null"));
}

#[test]
fn test_outgoing_sms_fans_out() {
    let sms = parse(&wp_document(&[
        WpMessageBuilder::outgoing(&["A", "B"]).body("same text").read(false),
    ]));
    let backup = convert_to_android(&sms, &empty_wp(), &assembler()).unwrap();
    let root = rendered(&backup);

    let records: Vec<&Element> = root.children_named("sms").collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].attr("address"), Some("A"));
    assert_eq!(records[1].attr("address"), Some("B"));
    for record in records {
        assert_eq!(record.attr("type"), Some("2"));
        assert_eq!(record.attr("status"), Some("0"));
        assert_eq!(record.attr("read"), Some("0"));
        assert_eq!(record.attr("body"), Some("same text"));
        assert_eq!(record.attr("date"), Some("1501354168000"));
    }
    assert_eq!(root.attr("count"), Some("2"));
}

#[test]
fn test_mms_document() {
    let mms = parse(&wp_document(&[WpMessageBuilder::incoming("+15550001")
        .body("look")
        .smil("<smil><body/></smil>")
        .text_part("0123456789")
        .binary_part("image/jpeg", &[7u8; 500])]));
    let backup = convert_to_android(&empty_wp(), &mms, &assembler()).unwrap();
    let root = rendered(&backup);

    let mms = root.child("mms").unwrap();
    assert_eq!(mms.attr("address"), Some("+15550001"));
    assert_eq!(mms.attr("body"), Some("look"));
    assert_eq!(mms.attr("m_size"), Some("510"));
    assert_eq!(mms.attr("m_id"), Some("msg00000-20170729184928@localhost"));
    assert_eq!(mms.attr("tr_id"), Some("id1_00000"));
    assert_eq!(mms.attr("ct_t"), Some("application/vnd.wap.multipart.related"));

    let parts: Vec<&Element> = mms.child("parts").unwrap().children.iter().collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].attr("cl"), Some("01smil"));
    assert_eq!(parts[0].attr("seq"), Some("-1"));
    assert_eq!(parts[0].attr("text"), Some("<smil><body/></smil>"));
    assert_eq!(parts[1].attr("cl"), Some("Text02.txt"));
    assert_eq!(parts[1].attr("text"), Some("0123456789"));
    assert_eq!(parts[1].attr("chset"), Some("106"));
    assert_eq!(parts[2].attr("cl"), Some("Image03.txt"));
    assert_eq!(parts[2].attr("text"), Some("null"));
    assert!(parts[2].attr("data").is_some());

    let addrs: Vec<(Option<&str>, Option<&str>)> = mms
        .child("addrs")
        .unwrap()
        .children
        .iter()
        .map(|a| (a.attr("address"), a.attr("type")))
        .collect();
    assert_eq!(
        addrs,
        vec![
            (Some("+15550001"), Some("137")),
            (Some("insert-address-token"), Some("151")),
        ]
    );
}

#[test]
fn test_smil_label_with_two_binaries() {
    let mms = parse(&wp_document(&[WpMessageBuilder::outgoing(&["+1", "+2"])
        .smil("<smil/>")
        .binary_part("image/png", &[1, 2, 3])
        .binary_part("image/gif", &[4, 5])]));
    let backup = convert_to_android(&empty_wp(), &mms, &assembler()).unwrap();
    let root = rendered(&backup);
    let mms = root.child("mms").unwrap();
    let smil = &mms.child("parts").unwrap().children[0];
    assert!(smil.attr("cl").unwrap().ends_with("02smil"));
    assert_eq!(mms.attr("address"), Some("+1~+2"));
    assert_eq!(mms.attr("body"), None);
}

#[test]
fn test_count_spans_both_documents() {
    let sms = parse(&wp_document(&[
        WpMessageBuilder::incoming("+1").body("a"),
        WpMessageBuilder::outgoing(&["+2", "+3", "+4"]).body("b"),
    ]));
    let mms = parse(&wp_document(&[
        WpMessageBuilder::incoming("+5").binary_part("image/png", &[0]),
        WpMessageBuilder::outgoing(&["+6"]).text_part("c"),
    ]));
    let backup = convert_to_android(&sms, &mms, &assembler()).unwrap();
    let root = rendered(&backup);

    let children = root.children.len();
    assert_eq!(root.attr("count"), Some(children.to_string().as_str()));
    assert_eq!(children, 6);
    let ids: Vec<&str> = root
        .children_named("mms")
        .filter_map(|m| m.attr("tr_id"))
        .collect();
    assert_eq!(ids, vec!["id1_00004", "id1_00005"]);
}

#[test]
fn test_mixed_document_is_partitioned() {
    let doc = parse(&wp_document(&[
        WpMessageBuilder::incoming("+5").binary_part("image/png", &[0]),
        WpMessageBuilder::incoming("+1").body("plain"),
    ]));
    let backup = convert_mixed_to_android(&doc, &assembler()).unwrap();
    let root = rendered(&backup);
    let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["sms", "mms"]);
}

#[test]
fn test_missing_field_aborts_conversion() {
    let sms = parse(&wp_document(&[
        WpMessageBuilder::incoming("+1").body("ok"),
        WpMessageBuilder::incoming("+2").without_sender(),
    ]));
    let err = convert_to_android(&sms, &empty_wp(), &assembler()).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::MissingField {
            index: Some(1),
            field: "Sender"
        }
    ));
}

#[test]
fn test_bad_attachment_aborts_conversion() {
    let mms = parse(&wp_document(&[
        WpMessageBuilder::incoming("+2").attachment("image/png", "***")
    ]));
    let err = convert_to_android(&empty_wp(), &mms, &assembler()).unwrap_err();
    assert!(matches!(err, ConvertError::Encoding { index: 0, .. }));
}

#[test_log::test]
fn test_reverse_conversion() {
    let android = parse(&android_document(&[
        android_sms(1, "+1555", 1_000_000_000_000, "hi", true),
        android_sms(2, "+1666", 1_000_000_500_000, "yo & co", false),
    ]));
    let (doc, report) = convert_to_wp(&android).unwrap();
    assert_eq!(report.count, 2);

    let text = doc.to_document_string().unwrap();
    assert!(text.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
    let messages = wp::read_messages(&parse(&text)).unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_incoming);
    assert_eq!(messages[0].sender, "+1555");
    assert!(messages[0].recipients.is_empty());
    assert!(!messages[1].is_incoming);
    assert_eq!(messages[1].recipients, vec!["+1666"]);
    assert_eq!(messages[1].body, "yo & co");
    assert!(!messages[1].is_read);
}

#[test]
fn test_reverse_rejects_unknown_type() {
    let android = parse(&android_document(&[
        android_sms(1, "+1555", 1, "ok", true),
        android_sms(3, "+1555", 1, "draft", true),
    ]));
    let err = convert_to_wp(&android).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::InvalidFormat {
            index: 1,
            sms_type: 3
        }
    ));
}

#[test]
fn test_reverse_rejects_draft_missing_body() {
    let android = parse(&android_document(&[
        r#"<sms address="+1" read="1" date_sent="10" type="3"/>"#.to_string(),
    ]));
    let err = convert_to_wp(&android).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::InvalidFormat {
            index: 0,
            sms_type: 3
        }
    ));
}

#[test]
fn test_reverse_rejects_out_of_range_date() {
    let android = parse(&android_document(&[android_sms(
        1,
        "+1555",
        1_000_000_000_000_000,
        "hi",
        true,
    )]));
    let err = convert_to_wp(&android).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::TimestampOutOfRange {
            ms: 1_000_000_000_000_000
        }
    ));
}

#[test]
fn test_round_trip_incoming_sms() {
    let android = parse(&android_document(&[android_sms(
        1,
        "+1555",
        1_000_000_000_000,
        "hi",
        true,
    )]));
    let (wp_doc, _) = convert_to_wp(&android).unwrap();
    let wp_doc = parse(&wp_doc.to_document_string().unwrap());
    let backup = convert_mixed_to_android(&wp_doc, &assembler()).unwrap();
    let root = rendered(&backup);

    let sms = root.child("sms").unwrap();
    assert_eq!(sms.attr("address"), Some("+1555"));
    assert_eq!(sms.attr("type"), Some("1"));
    assert_eq!(sms.attr("read"), Some("1"));
    assert_eq!(sms.attr("body"), Some("hi"));
    assert_eq!(sms.attr("date"), Some("1000000000000"));
}

#[test]
fn test_forward_preserves_multiline_body() {
    let sms = parse(&wp_document(&[
        WpMessageBuilder::incoming("+1").body("line 1\nline 2").timestamp(SAMPLE_TICKS),
    ]));
    let backup = convert_to_android(&sms, &empty_wp(), &assembler()).unwrap();
    let root = rendered(&backup);
    assert_eq!(root.child("sms").unwrap().attr("body"), Some("line 1\nline 2"));
}
