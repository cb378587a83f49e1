use chrono::NaiveDate;

pub const CANONICAL_DATE_FORMAT: &str = "%m/%d/%y";

/// Input shapes accepted for dates found in report text, tried in order.
pub const ACCEPTED_DATE_FORMATS: [&str; 2] = ["%m/%d/%y", "%d-%b-%y"];

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_INPUT_FORMATS: [&str; 4] = ["%m/%d/%y", "%m/%d/%Y", "%d-%b-%y", "%d-%b-%Y"];

/// Re-renders `text` in the canonical `mm/dd/yy` shape using the first format
/// that parses it. Text no format accepts is returned as-is.
pub fn normalize_date(text: &str, formats: &[&str]) -> String {
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
        .unwrap_or_else(|| text.to_string())
}

pub fn to_iso_date(text: &str) -> Option<String> {
    ISO_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
        .map(|date| date.format(ISO_DATE_FORMAT).to_string())
}
