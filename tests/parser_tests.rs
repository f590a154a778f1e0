use keytally::error::KeyTallyError;
use keytally::parser::KeystrokeReader;
use keytally::record::{KeystrokeRecord, EXPECTED_HEADER_LINE};
use rstest::rstest;
use std::io::Cursor;

const HEADER: &str = EXPECTED_HEADER_LINE;

fn reader(body: &str) -> Result<KeystrokeReader<Cursor<Vec<u8>>>, KeyTallyError> {
    KeystrokeReader::new(Cursor::new(body.as_bytes().to_vec()))
}

fn parse_all(body: &str) -> Result<Vec<KeystrokeRecord>, KeyTallyError> {
    reader(body)?.collect()
}

fn file(lines: &[&str]) -> String {
    let mut s = String::from(HEADER);
    s.push('\n');
    for line in lines {
        s.push_str(line);
        s.push('\n');
    }
    s
}

// --- NORMAL ROWS ---

#[test]
fn test_normal_rows_pass_through_unchanged() {
    let rows = [
        "5\t101\tthe cat\tthe cat\t1\t1473275784123\t1473275784200\tt\t84",
        "5\t101\tthe cat\tthe cat\t2\t1473275784300\t1473275784390\tSHIFT\t16",
    ];
    let records = parse_all(&file(&rows)).unwrap();

    assert_eq!(records.len(), 2);
    for (record, row) in records.iter().zip(rows) {
        let expected: Vec<&str> = row.split('\t').collect();
        assert_eq!(record.fields().to_vec(), expected);
    }
    assert_eq!(records[0].participant_id(), "5");
    assert_eq!(records[0].test_section_id(), "101");
    assert_eq!(records[0].sentence(), "the cat");
    assert_eq!(records[0].user_input(), "the cat");
    assert_eq!(records[0].keystroke_id(), "1");
    assert_eq!(records[0].press_time(), "1473275784123");
    assert_eq!(records[0].release_time(), "1473275784200");
    assert_eq!(records[1].key_name(), "SHIFT");
    assert_eq!(records[1].key_code(), "16");
}

#[test]
fn test_header_only_file_yields_nothing() {
    assert!(parse_all(&file(&[])).unwrap().is_empty());
}

#[test]
fn test_crlf_file_parses_like_lf() {
    let body = format!("{}\r\n1\t2\ts\tu\t3\t10\t20\te\t69\r\n", HEADER);
    let records = parse_all(&body).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key_code(), "69");
}

#[test]
fn test_latin1_bytes_are_decoded() {
    let mut bytes = format!("{}\n1\t2\ts\tu\t3\t10\t20\t", HEADER).into_bytes();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"\t233\n");
    let records = KeystrokeReader::new(Cursor::new(bytes))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records[0].key_name(), "\u{e9}");
}

// --- HEADER ---

#[rstest]
#[case::trailing_space(format!("{} ", HEADER))]
#[case::reordered(HEADER.replace("LETTER\tKEYCODE", "KEYCODE\tLETTER"))]
#[case::lowercase(HEADER.to_lowercase())]
#[case::leading_space(format!(" {}", HEADER))]
#[case::empty(String::new())]
fn test_header_mismatch_is_rejected(#[case] header: String) {
    let body = format!("{}\n1\t2\ts\tu\t3\t10\t20\te\t69\n", header);
    let err = reader(&body).err().expect("header must be rejected");
    assert!(err.is_format());
    assert_eq!(err.line(), Some(1));
    assert!(err.to_string().contains("unexpected header line"));
}

#[test]
fn test_empty_stream_is_rejected() {
    let err = reader("").err().expect("missing header");
    assert!(err.is_format());
    assert_eq!(err.line(), Some(1));
}

// --- LITERAL LF RECOVERY ---

#[test]
fn test_literal_lf_merges_continuation_line() {
    let body = file(&[
        "7\t1\tab\tab\t9\t100\t110\t",
        "\t13",
        "7\t1\tab\tab\t10\t200\t210\tb\t66",
    ]);
    let records = parse_all(&body).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key_name(), "LITERAL_LF");
    assert_eq!(records[0].key_code(), "13");
    assert_eq!(records[0].keystroke_id(), "9");
    assert_eq!(records[0].release_time(), "110");
    assert_eq!(records[1].key_name(), "b");
}

#[test]
fn test_literal_lf_advances_line_count_by_two() {
    let body = file(&["7\t1\tab\tab\t9\t100\t110\t", "\t13", "garbage"]);
    let mut it = reader(&body).unwrap();

    let first = it.next().unwrap().unwrap();
    assert_eq!(first.key_name(), "LITERAL_LF");
    assert_eq!(it.line_index(), 3);

    let err = it.next().unwrap().unwrap_err();
    assert_eq!(err.line(), Some(4));
    assert!(it.next().is_none(), "sequence ends after an error");
}

#[test]
fn test_literal_lf_at_end_of_file_is_truncation() {
    let body = file(&["7\t1\tab\tab\t9\t100\t110\t"]);
    let err = parse_all(&body).unwrap_err();
    assert!(err.is_format());
    // Counter moves past the missing continuation line before failing.
    assert_eq!(err.line(), Some(3));
}

#[rstest]
#[case::continuation_too_wide("\t13\textra")]
#[case::continuation_too_narrow("13")]
#[case::slot_occupied("x\t13")]
fn test_literal_lf_bad_continuation(#[case] continuation: &str) {
    let body = file(&["7\t1\tab\tab\t9\t100\t110\t", continuation]);
    let err = parse_all(&body).unwrap_err();
    assert!(err.is_format());
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_literal_lf_first_half_with_occupied_slot() {
    let body = file(&["7\t1\tab\tab\t9\t100\t110\tq", "\t13"]);
    let err = parse_all(&body).unwrap_err();
    assert!(err.is_format());
    assert!(err.to_string().contains("unexpected format"));
}

// --- LITERAL TAB RECOVERY ---

#[test]
fn test_literal_tab_collapses_extra_column() {
    let body = file(&["3\t4\ta b\ta b\t5\t100\t150\t\t\t9"]);
    let records = parse_all(&body).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key_name(), "LITERAL_TAB");
    assert_eq!(records[0].key_code(), "9");
    assert_eq!(records[0].sentence(), "a b");
}

#[rstest]
#[case::slot7("3\t4\ts\tu\t5\t100\t150\tx\t\t9")]
#[case::slot8("3\t4\ts\tu\t5\t100\t150\t\tx\t9")]
fn test_literal_tab_with_occupied_slots_fails(#[case] row: &str) {
    let err = parse_all(&file(&[row])).unwrap_err();
    assert!(err.is_format());
    assert_eq!(err.line(), Some(2));
}

// --- ABNORMAL ROWS ---

#[rstest]
#[case::one_field("lonely")]
#[case::seven_fields("1\t2\t3\t4\t5\t6\t7")]
#[case::eleven_fields("1\t2\t3\t4\t5\t6\t7\t8\t9\t10\t11")]
#[case::empty_line("")]
fn test_unexpected_field_count_reports_line(#[case] row: &str) {
    let body = file(&["1\t2\ts\tu\t3\t10\t20\te\t69", row]);
    let mut it = reader(&body).unwrap();

    assert!(it.next().unwrap().is_ok());
    let err = it.next().unwrap().unwrap_err();
    assert!(err.is_format());
    assert_eq!(err.line(), Some(3));
    assert!(err.to_string().starts_with("line: 3, "));
    assert!(err.to_string().contains("unexpected format"));
}

#[test]
fn test_lone_cr_inside_key_name_splits_the_record() {
    // Text-mode reading treats CR as a line break, which yields the LF shape.
    let body = format!("{}\n7\t1\tab\tab\t9\t100\t110\t\r\t13\n", HEADER);
    let records = parse_all(&body).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key_name(), "LITERAL_LF");
}

#[test]
fn test_error_preserves_inner_kind() {
    let err = parse_all(&file(&["a\tb"])).unwrap_err();
    match &err {
        KeyTallyError::AtLine { line, source } => {
            assert_eq!(*line, 2);
            assert!(matches!(**source, KeyTallyError::Format(_)));
        }
        other => panic!("expected AtLine, got {:?}", other),
    }
}
