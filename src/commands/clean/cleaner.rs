use super::aliases::{CategoricalNormalizer, CategoryField};
use crate::cli::DateStyle;
use crate::commands::extract::to_iso_date;
use crate::model::{CanonicalRecord, CleanCounts, ExtractedRecord, SanctionAmount};

#[derive(Debug, Default)]
pub struct CleanOutcome {
    pub records: Vec<CanonicalRecord>,
    pub counts: CleanCounts,
}

/// Turns the concatenated extraction table into the canonical dataset.
///
/// Rows keep their input order. A row survives only when every column except
/// the sanction amount holds a real value; an amount that does not read as a
/// number is blanked rather than dropping the row.
pub struct Cleaner {
    normalizer: CategoricalNormalizer,
    date_style: DateStyle,
}

impl Cleaner {
    pub fn new(normalizer: CategoricalNormalizer, date_style: DateStyle) -> Self {
        Self {
            normalizer,
            date_style,
        }
    }

    pub fn clean<I>(&self, rows: I) -> CleanOutcome
    where
        I: IntoIterator<Item = ExtractedRecord>,
    {
        let mut outcome = CleanOutcome::default();

        for row in rows {
            outcome.counts.rows_read += 1;
            if let Some(record) = self.clean_row(row, &mut outcome.counts) {
                outcome.records.push(record);
            }
        }

        outcome.counts.rows_written = outcome.records.len();
        outcome
    }

    fn clean_row(&self, row: ExtractedRecord, counts: &mut CleanCounts) -> Option<CanonicalRecord> {
        let ExtractedRecord {
            case_number,
            name,
            entity_type,
            date_known,
            action,
            sanction_amount,
            sanction,
            case_type,
            closed_date,
        } = row;

        let Some(case_number) = present(case_number) else {
            counts.dropped_missing_case_number += 1;
            return None;
        };

        let entity_type = self.category(CategoryField::EntityType, entity_type, counts);
        let action = self.category(CategoryField::Action, action, counts);
        let sanction = self.category(CategoryField::Sanction, sanction, counts);
        let case_type = self.category(CategoryField::CaseType, case_type, counts);
        let date_known = self.date(date_known);
        let closed_date = self.date(closed_date);

        let assembled = || -> Option<CanonicalRecord> {
            Some(CanonicalRecord {
                case_number,
                name: present(name)?,
                entity_type: present(entity_type)?,
                date_known: present(date_known)?,
                action: present(action)?,
                sanction_amount: None,
                sanction: present(sanction)?,
                case_type: present(case_type)?,
                closed_date: present(closed_date)?,
            })
        };

        let Some(mut record) = assembled() else {
            counts.dropped_incomplete += 1;
            return None;
        };

        record.sanction_amount = coerce_amount(sanction_amount, counts);
        Some(record)
    }

    fn category(
        &self,
        field: CategoryField,
        value: Option<String>,
        counts: &mut CleanCounts,
    ) -> Option<String> {
        let normalized = self.normalizer.normalize(field, &value?);
        if normalized.aliased {
            *alias_counter(counts, field) += 1;
        }
        Some(normalized.value)
    }

    fn date(&self, value: Option<String>) -> Option<String> {
        match self.date_style {
            DateStyle::Canonical => value,
            DateStyle::Iso => value.and_then(|text| to_iso_date(&text)),
        }
    }
}

/// Trimmed value, or `None` for null, blank and `nan` cells.
pub fn present(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(trimmed.to_string())
}

pub fn coerce_amount(amount: Option<SanctionAmount>, counts: &mut CleanCounts) -> Option<f64> {
    match amount? {
        SanctionAmount::Quantity(text) => {
            let parsed = text
                .trim()
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite());
            if parsed.is_none() {
                counts.amount_coercion_failures += 1;
            }
            parsed
        }
        SanctionAmount::NotApplicable => None,
    }
}

fn alias_counter(counts: &mut CleanCounts, field: CategoryField) -> &mut usize {
    match field {
        CategoryField::EntityType => &mut counts.entity_type_aliases_applied,
        CategoryField::Action => &mut counts.action_aliases_applied,
        CategoryField::Sanction => &mut counts.sanction_aliases_applied,
        CategoryField::CaseType => &mut counts.case_type_aliases_applied,
    }
}
