use super::dates::{ACCEPTED_DATE_FORMATS, normalize_date, to_iso_date};
use super::fields::{Closing, Party, RecordExtractor, SanctionMatch, is_numeric_sanction};
use super::run::extract_document;
use super::segment::LineSegmenter;
use super::text_layer::split_text_lines;
use crate::model::{ExtractedRecord, SanctionAmount, Stage};

fn extractor() -> RecordExtractor {
    RecordExtractor::new().expect("extractor regexes compile")
}

fn segmenter() -> LineSegmenter {
    LineSegmenter::new().expect("segmenter regex compiles")
}

#[test]
fn extract_carves_all_nine_fields_from_a_complete_record() {
    let extraction = extractor().extract(
        "2010WP12345 ACME AIRLINES INC A/C or COMM OPER 1/2/17 FAILURE TO COMPLY 5,000 DOLLARS CIVIL PENALTY 3/4/17",
    );

    assert_eq!(extraction.stopped_at, None);
    assert_eq!(
        extraction.record,
        ExtractedRecord {
            case_number: Some("2010WP12345".to_string()),
            name: Some("ACME AIRLINES INC".to_string()),
            entity_type: Some("A/C or COMM OPER".to_string()),
            date_known: Some("01/02/17".to_string()),
            action: Some("FAILURE TO COMPLY".to_string()),
            sanction_amount: Some(SanctionAmount::Quantity("5,000".to_string())),
            sanction: Some("DOLLARS".to_string()),
            case_type: Some("CIVIL PENALTY".to_string()),
            closed_date: Some("03/04/17".to_string()),
        }
    );
}

#[test]
fn extract_without_leading_case_number_yields_all_null_record() {
    let extractor = extractor();

    for text in [
        "",
        "   ",
        "PAGE 3 OF 12 2010WP12345 ACME A/C or COMM OPER 1/2/17",
        "201WP12345 ACME A/C or COMM OPER 1/2/17 500 DOLLARS CIVIL PENALTY 3/4/17",
    ] {
        let extraction = extractor.extract(text);
        assert_eq!(extraction.record, ExtractedRecord::default(), "input: {text:?}");
        assert_eq!(extraction.stopped_at, Some(Stage::CaseNumber));
    }
}

#[test]
fn extract_stops_after_entity_type_when_no_date_follows() {
    let extraction = extractor().extract("2013GL010001 JANE SMITH CERTIFICATE SHCOOL PENDING REVIEW");

    assert_eq!(extraction.stopped_at, Some(Stage::DateKnown));
    assert_eq!(extraction.record.case_number.as_deref(), Some("2013GL010001"));
    assert_eq!(extraction.record.name.as_deref(), Some("JANE SMITH"));
    assert_eq!(
        extraction.record.entity_type.as_deref(),
        Some("CERTIFICATE SHCOOL")
    );
    assert_eq!(extraction.record.date_known, None);
    assert_eq!(extraction.record.action, None);
    assert_eq!(extraction.record.sanction_amount, None);
    assert_eq!(extraction.record.sanction, None);
    assert_eq!(extraction.record.case_type, None);
    assert_eq!(extraction.record.closed_date, None);
}

#[test]
fn extract_leaves_tail_null_when_entity_type_is_missing_even_if_dates_follow() {
    let extraction =
        extractor().extract("2011SW000200 SOMEONE UNKNOWN PARTY 1/2/11 500 DOLLARS CIVIL PENALTY 3/4/11");

    assert_eq!(extraction.stopped_at, Some(Stage::EntityType));
    assert_eq!(extraction.record.case_number.as_deref(), Some("2011SW000200"));
    assert_eq!(extraction.record.name, None);
    assert_eq!(extraction.record.date_known, None);
    assert_eq!(extraction.record.sanction, None);
    assert_eq!(extraction.record.closed_date, None);
}

#[test]
fn extract_prefers_rightmost_sanction_token() {
    let extraction = extractor().extract(
        "2012EA210045 SKYLINE AVIATION APPROVD REPAIR STA 12-Mar-12 ORDER WAIVED IN PART CERTIFICATE REVOCATION MAINTENANCE 4/5/12",
    );

    let record = extraction.record;
    assert_eq!(record.name.as_deref(), Some("SKYLINE AVIATION"));
    assert_eq!(record.date_known.as_deref(), Some("03/12/12"));
    assert_eq!(record.sanction.as_deref(), Some("REVOCATION"));
    assert_eq!(
        record.action.as_deref(),
        Some("ORDER WAIVED IN PART CERTIFICATE")
    );
    assert_eq!(record.sanction_amount, Some(SanctionAmount::NotApplicable));
    assert_eq!(record.case_type.as_deref(), Some("MAINTENANCE"));
    assert_eq!(record.closed_date.as_deref(), Some("04/05/12"));
}

#[test]
fn extract_takes_amount_only_from_text_before_rightmost_sanction() {
    let extraction = extractor().extract(
        "2015SW990001 BLUE SKY CHARTER SCHED AIR CARRIER 7/14/15 FAILED TO REPORT WAIVED INSPECTION 12,500.50 DOLLARS CIVIL PENALTY 9/1/15",
    );

    let record = extraction.record;
    assert_eq!(record.entity_type.as_deref(), Some("SCHED AIR CARRIER"));
    assert_eq!(record.sanction.as_deref(), Some("DOLLARS"));
    assert_eq!(
        record.action.as_deref(),
        Some("FAILED TO REPORT WAIVED INSPECTION")
    );
    assert_eq!(
        record.sanction_amount,
        Some(SanctionAmount::Quantity("12,500.50".to_string()))
    );
    assert_eq!(record.case_type.as_deref(), Some("CIVIL PENALTY"));
}

#[test]
fn extract_keeps_whole_block_as_action_when_numeric_sanction_has_no_number() {
    let extraction = extractor()
        .extract("2016CE000777 ROTOR WORKS AGRI OPR 3/3/16 NO ACTION TAKEN DAYS SUSPENSION 4/4/16");

    let record = extraction.record;
    assert_eq!(record.sanction.as_deref(), Some("DAYS"));
    assert_eq!(record.action.as_deref(), Some("NO ACTION TAKEN"));
    assert_eq!(record.sanction_amount, None);
    assert_eq!(record.case_type.as_deref(), Some("SUSPENSION"));
    assert_eq!(record.closed_date.as_deref(), Some("04/04/16"));
}

#[test]
fn extract_distinguishes_sanction_waived_from_bare_waived() {
    let extractor = extractor();

    let phrase = extractor.extract(
        "2017SO000101 JOHN DOE COMP PROD 2/2/17 CIVIL PENALTY 500 sanction waived CIVIL PENALTY 6/6/17",
    );
    assert_eq!(phrase.record.sanction.as_deref(), Some("SANCTION WAIVED"));
    assert_eq!(
        phrase.record.sanction_amount,
        Some(SanctionAmount::Quantity("500".to_string()))
    );
    assert_eq!(phrase.record.action.as_deref(), Some("CIVIL PENALTY"));

    let bare = extractor.extract(
        "2017SO000102 JOHN DOE COMP PROD 2/2/17 CIVIL PENALTY 500 WAIVED CIVIL PENALTY 6/6/17",
    );
    assert_eq!(bare.record.sanction.as_deref(), Some("WAIVED"));
    assert_eq!(bare.record.sanction_amount, Some(SanctionAmount::NotApplicable));
    assert_eq!(bare.record.action.as_deref(), Some("CIVIL PENALTY 500"));
}

#[test]
fn extract_keeps_earlier_fields_when_closed_date_is_missing() {
    let extraction = extractor()
        .extract("2018GL000500 PRAIRIE AG EXT LOAD 10/11/18 UNSAFE OPERATION 1,200 DOLLARS CIVIL PENALTY");

    assert_eq!(extraction.stopped_at, Some(Stage::ClosedDate));
    let record = extraction.record;
    assert_eq!(record.action.as_deref(), Some("UNSAFE OPERATION"));
    assert_eq!(
        record.sanction_amount,
        Some(SanctionAmount::Quantity("1,200".to_string()))
    );
    assert_eq!(record.sanction.as_deref(), Some("DOLLARS"));
    assert_eq!(record.case_type, None);
    assert_eq!(record.closed_date, None);
}

#[test]
fn extract_passes_unparsable_dates_through_raw() {
    let extraction = extractor().extract(
        "2019WP000001 ACME A/C or COMM OPER 12/25/2019 LATE FILING 250 DOLLARS CIVIL PENALTY 2/30/19",
    );

    assert_eq!(extraction.record.date_known.as_deref(), Some("12/25/2019"));
    assert_eq!(extraction.record.closed_date.as_deref(), Some("2/30/19"));
    assert_eq!(extraction.stopped_at, None);
}

#[test]
fn extract_normalizes_dashes_and_whitespace_before_matching() {
    let extraction = extractor().extract(
        "2014NM000321   DESERT AIR\tFOREIGN AIR CA  5\u{2013}Jan\u{2013}14\nCERT SUSPEND 90 DAYS\u{00A0}SUSPENSION 7\u{2014}Feb\u{2014}14",
    );

    let record = extraction.record;
    assert_eq!(record.name.as_deref(), Some("DESERT AIR"));
    assert_eq!(record.entity_type.as_deref(), Some("FOREIGN AIR CA"));
    assert_eq!(record.date_known.as_deref(), Some("01/05/14"));
    assert_eq!(record.action.as_deref(), Some("CERT SUSPEND"));
    assert_eq!(
        record.sanction_amount,
        Some(SanctionAmount::Quantity("90".to_string()))
    );
    assert_eq!(record.sanction.as_deref(), Some("DAYS"));
    assert_eq!(record.case_type.as_deref(), Some("SUSPENSION"));
    assert_eq!(record.closed_date.as_deref(), Some("02/07/14"));
}

#[test]
fn extract_matches_entity_type_case_insensitively_and_keeps_source_spelling() {
    let extraction = extractor()
        .extract("2020SO000042 small co a/c or comm oper 1/1/20 bad records 10 dollars civil penalty 2/2/20");

    let record = extraction.record;
    assert_eq!(record.name.as_deref(), Some("small co"));
    assert_eq!(record.entity_type.as_deref(), Some("a/c or comm oper"));
    assert_eq!(record.sanction.as_deref(), Some("DOLLARS"));
    assert_eq!(record.action.as_deref(), Some("bad records"));
}

#[test]
fn stages_advance_the_cursor_independently() {
    let extractor = extractor();

    let (case_number, rest) = extractor
        .case_number("2010WP12345 ACME INC AGRI OPR 1/2/17 X 5 DAYS Y 3/4/17")
        .expect("case number found");
    assert_eq!(case_number, "2010WP12345");
    assert_eq!(rest, "ACME INC AGRI OPR 1/2/17 X 5 DAYS Y 3/4/17");

    let (party, rest) = extractor.party(rest).expect("entity type found");
    assert_eq!(
        party,
        Party {
            name: "ACME INC",
            entity_type: "AGRI OPR"
        }
    );

    let (date_known, rest) = extractor.date_known(rest).expect("date found");
    assert_eq!(date_known, "1/2/17");
    assert_eq!(rest, "X 5 DAYS Y 3/4/17");

    let (sanction, rest) = extractor.sanction(rest).expect("sanction found");
    assert_eq!(
        sanction,
        SanctionMatch {
            kind: "DAYS".to_string(),
            preceding: "X 5"
        }
    );
    assert_eq!(rest, "Y 3/4/17");

    let (closing, rest) = extractor.closing(rest).expect("closing date found");
    assert_eq!(
        closing,
        Closing {
            case_type: "Y",
            closed_date: "3/4/17"
        }
    );
    assert_eq!(rest, "");

    assert!(extractor.party("NOTHING TO SEE").is_none());
    assert!(extractor.sanction("NO TOKENS HERE").is_none());
}

#[test]
fn numeric_sanction_subset_matches_documented_tokens() {
    for kind in ["DOLLARS", "DOLLAR", "DAYS", "DAY", "SANCTION WAIVED"] {
        assert!(is_numeric_sanction(kind), "{kind}");
    }
    for kind in ["WAIVED", "REVOCATION", "INDEFINITE", "CONSOLIDATED CASE", "PENDING COMPLIANCE"] {
        assert!(!is_numeric_sanction(kind), "{kind}");
    }
}

#[test]
fn segment_groups_lines_by_case_number_and_drops_leading_noise() {
    let lines = vec![
        "FAA ENFORCEMENT ACTIONS",
        "CASE NUMBER NAME ENTITY TYPE",
        "",
        "2010WP12345 ACME",
        "  AIRLINES INC  ",
        "",
        "A/C or COMM OPER 1/2/17",
        "  2010WP12346 OTHER CO",
        "Case 2010WP99999 mentioned inline",
    ];

    let records = segmenter().segment(lines);
    assert_eq!(
        records,
        vec![
            "2010WP12345 ACME AIRLINES INC A/C or COMM OPER 1/2/17".to_string(),
            "2010WP12346 OTHER CO Case 2010WP99999 mentioned inline".to_string(),
        ]
    );
}

#[test]
fn segment_without_any_case_number_yields_nothing() {
    let records = segmenter().segment(vec!["header", "", "footer page 1"]);
    assert!(records.is_empty());
}

#[test]
fn normalize_date_keeps_canonical_dates_and_converts_alternate_shape() {
    assert_eq!(normalize_date("01/02/17", &ACCEPTED_DATE_FORMATS), "01/02/17");
    assert_eq!(normalize_date("12/31/99", &ACCEPTED_DATE_FORMATS), "12/31/99");
    assert_eq!(normalize_date("1/2/17", &ACCEPTED_DATE_FORMATS), "01/02/17");
    assert_eq!(normalize_date("5-Jan-17", &ACCEPTED_DATE_FORMATS), "01/05/17");
    assert_eq!(normalize_date("05-JAN-17", &ACCEPTED_DATE_FORMATS), "01/05/17");
}

#[test]
fn normalize_date_returns_input_when_no_format_matches() {
    for text in ["12/25/2017", "01-Jan-2014", "2/30/17", "123/4/17", "soon"] {
        assert_eq!(normalize_date(text, &ACCEPTED_DATE_FORMATS), text);
    }
    assert_eq!(normalize_date("5-Jan-17", &["%m/%d/%y"]), "5-Jan-17");
}

#[test]
fn to_iso_date_reads_canonical_and_four_digit_years() {
    assert_eq!(to_iso_date("01/02/17").as_deref(), Some("2017-01-02"));
    assert_eq!(to_iso_date("12/25/2017").as_deref(), Some("2017-12-25"));
    assert_eq!(to_iso_date("01-Jan-2014").as_deref(), Some("2014-01-01"));
    assert_eq!(to_iso_date("2/30/17"), None);
    assert_eq!(to_iso_date("nan"), None);
}

#[test]
fn extract_document_indexes_rows_in_segment_order() {
    let lines = vec![
        "Quarterly report".to_string(),
        "2010WP12345 ACME AIRLINES INC A/C or COMM OPER 1/2/17".to_string(),
        "FAILURE TO COMPLY 5,000 DOLLARS CIVIL PENALTY 3/4/17".to_string(),
        "2010WP12346 NOBODY".to_string(),
    ];

    let extraction = extract_document(&segmenter(), &extractor(), &lines);

    assert_eq!(extraction.lines_read, 4);
    assert_eq!(extraction.rows.len(), 2);
    assert_eq!(extraction.rows[0].record_index, 0);
    assert_eq!(extraction.rows[0].extraction.stopped_at, None);
    assert_eq!(
        extraction.rows[0].extraction.record.closed_date.as_deref(),
        Some("03/04/17")
    );
    assert_eq!(extraction.rows[1].record_index, 1);
    assert_eq!(extraction.rows[1].raw_text, "2010WP12346 NOBODY");
    assert_eq!(
        extraction.rows[1].extraction.stopped_at,
        Some(Stage::EntityType)
    );
}

#[test]
fn split_text_lines_breaks_on_form_feeds() {
    let lines = split_text_lines("first\r\nsecond\u{000C}third\u{0000}\n");
    assert_eq!(lines, vec!["first", "second", "third", ""]);
}
