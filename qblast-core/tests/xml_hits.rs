mod common;

use common::{blast_xml, xml_hit, xml_hit_without_hsp};
use qblast_core::xml::{parse_hits, IncompleteHitPolicy, ParseOptions};
use qblast_core::QblastError;

#[test]
fn three_hits_one_incomplete_gives_two_records_in_order() {
    let xml = blast_xml(&[
        &xml_hit("hit-a", "first", 50, 50, "0.0"),
        &xml_hit_without_hsp("hit-b"),
        &xml_hit("hit-c", "third", 40, 52, "4e-10"),
    ]);
    let mut skipped = Vec::new();

    let parsed = parse_hits(&xml, &ParseOptions::default(), |i| skipped.push(i)).unwrap();

    let ids: Vec<&str> = parsed.records.iter().map(|r| r.target_id.as_str()).collect();
    assert_eq!(ids, vec!["hit-a", "hit-c"]);
    assert_eq!(parsed.skipped, 1);
    assert_eq!(skipped, vec![2]);
    assert_eq!(parsed.records[0].evalue, 0.0);
    assert_eq!(parsed.records[1].align_len, 52);
}

#[test]
fn unclosed_tag_is_parse_error() {
    let xml = "<BlastOutput><Iteration_hits><Hit><Hit_id>x</Hit_id><Hit_hsps><Hsp>";
    let err = parse_hits(xml, &ParseOptions::default(), |_| {}).unwrap_err();
    assert!(matches!(err, QblastError::Parse { .. }));
}

#[test]
fn mismatched_tag_is_parse_error() {
    let valid = xml_hit("hit-a", "first", 50, 50, "0.0");
    let xml = blast_xml(&[&valid.replace("</Hit_def>", "</Hit_id>")]);
    let err = parse_hits(&xml, &ParseOptions::default(), |_| {}).unwrap_err();
    assert!(matches!(err, QblastError::Parse { .. }));
}

#[test]
fn reject_policy_names_the_offending_hit() {
    let xml = blast_xml(&[&xml_hit("hit-a", "first", 50, 50, "0.0"), &xml_hit_without_hsp("hit-b")]);
    let options = ParseOptions { policy: IncompleteHitPolicy::Reject, max_hits: None };
    let err = parse_hits(&xml, &options, |_| {}).unwrap_err();
    assert!(err.to_string().contains("hit 2"));
}

#[test]
fn cdata_sections_are_read() {
    let hit = xml_hit("hit-a", "<![CDATA[Gene <X> & co]]>", 50, 50, "0.0");
    let parsed = parse_hits(&blast_xml(&[&hit]), &ParseOptions::default(), |_| {}).unwrap();
    assert_eq!(parsed.records[0].target_description, "Gene <X> & co");
}
