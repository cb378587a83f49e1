use anyhow::{Context, Result};
use regex::Regex;

/// Case numbers look like `2010WP12345`: four digits, two or three capitals,
/// five or six digits.
pub const CASE_NUMBER_PATTERN: &str = r"^[0-9]{4}[A-Z]{2,3}[0-9]{5,6}";

/// Groups report lines into one string per case.
///
/// A case starts at every line beginning with a case number and runs until the
/// next one. Lines seen before the first case number (page headers, column
/// titles) are dropped.
pub struct LineSegmenter {
    anchor: Regex,
}

impl LineSegmenter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor: Regex::new(CASE_NUMBER_PATTERN)
                .context("failed to compile case number anchor regex")?,
        })
    }

    pub fn segment<'a, I>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut records = Vec::<String>::new();
        let mut current: Option<Vec<&'a str>> = None;

        for raw_line in lines {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if self.anchor.is_match(line) {
                if let Some(parts) = current.take() {
                    records.push(parts.join(" "));
                }
                current = Some(vec![line]);
                continue;
            }

            if let Some(parts) = current.as_mut() {
                parts.push(line);
            }
        }

        if let Some(parts) = current {
            records.push(parts.join(" "));
        }

        records
    }
}
