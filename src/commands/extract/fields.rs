use anyhow::{Context, Result};
use regex::Regex;

use super::dates::{ACCEPTED_DATE_FORMATS, normalize_date};
use super::segment::CASE_NUMBER_PATTERN;
use crate::model::{ExtractedRecord, Extraction, SanctionAmount, Stage};

/// Entity type spellings seen in the reports, OCR slips included. Order
/// matters: the first alternative matching at the leftmost position wins.
pub const ENTITY_TYPES: &[&str] = &[
    "A/C or COMM OPER",
    "A/C or COMM OPER CARRIER",
    "APPROVD REPAIR STA",
    "ARPT OPN/INSP ",
    "AIRCRAFT PROD",
    "CERTIFICATE SCHOOL",
    "CERTIFICATE SHCOOL",
    "FOREIGN AIR CAR",
    "FOREIGN AIR CA",
    "COMP PROD",
    "AIRPORT OPERATOR",
    "AGRI OPR",
    "EXT LOAD",
    "SCHED AIR CARRIER",
    "AIR CARRIER ON DMAND",
    "APPROVED RPR STN",
    "SUPP AIR CARRIER",
    "COMM OPER & PART 125",
];

pub const SANCTION_TYPES: &[&str] = &[
    "DOLLARS",
    "DOLLAR",
    "DAYS",
    "DAY",
    "WAIVED",
    "SANCTION WAIVED",
    "REVOCATION",
    "INDEFINITE DURATION",
    "INDEFINITE",
    "INDEFINTE DURATION",
    "INDEFINIT E DURATION",
    "CONSOLIDATED CASE",
    "CONSOLIDAT ED CASE",
    "CONSOLID ATED CASE",
    "CONSOLIDA TED CASE",
    "CONSOLIDATE D CASE",
    "PENDING COMPLIANCE",
];

/// Sanctions that are preceded by a quantity in the action column.
pub const NUMERIC_SANCTION_TYPES: &[&str] = &["DOLLARS", "DOLLAR", "DAYS", "DAY", "SANCTION WAIVED"];

const DATE_PATTERN: &str =
    r"(?i)\b[0-9]{1,3}/[0-9]{1,2}/[0-9]{2,4}\b|\b[0-9]{1,2}-[A-Za-z]{3}-[0-9]{2,4}\b";
const NUMBER_PATTERN: &str = r"\b[0-9]+(?:,[0-9]{3})*(?:\.[0-9]+)?\b";

/// A stage either yields its value together with the text left after its
/// match, or stops the pipeline.
pub(super) type Carved<'a, T> = Option<(T, &'a str)>;

#[derive(Debug, PartialEq, Eq)]
pub(super) struct Party<'a> {
    pub name: &'a str,
    pub entity_type: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) struct SanctionMatch<'a> {
    pub kind: String,
    pub preceding: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) struct Closing<'a> {
    pub case_type: &'a str,
    pub closed_date: &'a str,
}

/// Carves the nine case fields out of a single record string.
///
/// Every stage only looks at the text after the previous stage's match, so a
/// field can never be taken from text an earlier field already consumed. The
/// first stage that finds nothing ends extraction; its field and every later
/// one stay `None`.
pub struct RecordExtractor {
    case_number: Regex,
    entity_type: Regex,
    date: Regex,
    sanction: Regex,
    number: Regex,
    dash: Regex,
}

impl RecordExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            case_number: Regex::new(CASE_NUMBER_PATTERN)
                .context("failed to compile case number regex")?,
            entity_type: Regex::new(&case_insensitive_alternation(ENTITY_TYPES))
                .context("failed to compile entity type regex")?,
            date: Regex::new(DATE_PATTERN).context("failed to compile date regex")?,
            sanction: Regex::new(&case_insensitive_alternation(SANCTION_TYPES))
                .context("failed to compile sanction type regex")?,
            number: Regex::new(NUMBER_PATTERN).context("failed to compile amount regex")?,
            dash: Regex::new(r"\p{Pd}").context("failed to compile dash regex")?,
        })
    }

    pub fn extract(&self, raw: &str) -> Extraction {
        let text = self.prepare(raw);
        let mut record = ExtractedRecord::default();
        let stopped_at = self.carve(&text, &mut record).err();
        Extraction { record, stopped_at }
    }

    fn carve(&self, text: &str, record: &mut ExtractedRecord) -> Result<(), Stage> {
        let (case_number, rest) = self.case_number(text).ok_or(Stage::CaseNumber)?;
        record.case_number = Some(case_number.to_string());

        let (party, rest) = self.party(rest).ok_or(Stage::EntityType)?;
        record.name = Some(party.name.to_string());
        record.entity_type = Some(party.entity_type.to_string());

        let (date_known, rest) = self.date_known(rest).ok_or(Stage::DateKnown)?;
        record.date_known = Some(normalize_date(date_known, &ACCEPTED_DATE_FORMATS));

        let (sanction, rest) = self.sanction(rest).ok_or(Stage::Sanction)?;
        let (action, amount) = self.action_and_amount(&sanction);
        record.action = Some(action);
        record.sanction_amount = amount;
        record.sanction = Some(sanction.kind);

        let (closing, _) = self.closing(rest).ok_or(Stage::ClosedDate)?;
        record.case_type = Some(closing.case_type.to_string());
        record.closed_date = Some(normalize_date(closing.closed_date, &ACCEPTED_DATE_FORMATS));

        Ok(())
    }

    /// Collapses whitespace runs and folds every dash punctuation character
    /// to `-` so dates like `5–Jan–17` still match.
    pub(super) fn prepare(&self, raw: &str) -> String {
        let collapsed = raw.split_whitespace().collect::<Vec<&str>>().join(" ");
        self.dash.replace_all(&collapsed, "-").into_owned()
    }

    pub(super) fn case_number<'a>(&self, text: &'a str) -> Carved<'a, &'a str> {
        let found = self.case_number.find(text)?;
        Some((found.as_str(), text[found.end()..].trim()))
    }

    pub(super) fn party<'a>(&self, rest: &'a str) -> Carved<'a, Party<'a>> {
        let found = self.entity_type.find(rest)?;
        let party = Party {
            name: rest[..found.start()].trim(),
            entity_type: found.as_str(),
        };
        Some((party, rest[found.end()..].trim()))
    }

    pub(super) fn date_known<'a>(&self, rest: &'a str) -> Carved<'a, &'a str> {
        let found = self.date.find(rest)?;
        Some((found.as_str(), rest[found.end()..].trim()))
    }

    /// Picks the rightmost sanction token: free-form action text ahead of it
    /// may contain sanction words of its own.
    pub(super) fn sanction<'a>(&self, rest: &'a str) -> Carved<'a, SanctionMatch<'a>> {
        let found = self.sanction.find_iter(rest).last()?;
        let sanction = SanctionMatch {
            kind: found.as_str().to_uppercase(),
            preceding: rest[..found.start()].trim(),
        };
        Some((sanction, rest[found.end()..].trim()))
    }

    pub(super) fn action_and_amount(
        &self,
        sanction: &SanctionMatch<'_>,
    ) -> (String, Option<SanctionAmount>) {
        if !is_numeric_sanction(&sanction.kind) {
            return (
                sanction.preceding.to_string(),
                Some(SanctionAmount::NotApplicable),
            );
        }

        match self.number.find(sanction.preceding) {
            Some(found) => (
                sanction.preceding[..found.start()].trim().to_string(),
                Some(SanctionAmount::Quantity(found.as_str().to_string())),
            ),
            None => (sanction.preceding.to_string(), None),
        }
    }

    pub(super) fn closing<'a>(&self, rest: &'a str) -> Carved<'a, Closing<'a>> {
        let found = self.date.find(rest)?;
        let closing = Closing {
            case_type: rest[..found.start()].trim(),
            closed_date: found.as_str(),
        };
        Some((closing, rest[found.end()..].trim()))
    }
}

pub fn is_numeric_sanction(kind: &str) -> bool {
    NUMERIC_SANCTION_TYPES.contains(&kind)
}

fn case_insensitive_alternation(tokens: &[&str]) -> String {
    let alternatives = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<String>>()
        .join("|");
    format!("(?i)(?:{alternatives})")
}
