use serde::{Deserialize, Serialize};

/// Amount carved next to a sanction token.
///
/// `NotApplicable` marks sanctions that never carry a quantity (revocation,
/// consolidated case, ...) and is kept apart from "no number found", which is
/// represented by the surrounding `Option` being `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanctionAmount {
    Quantity(String),
    NotApplicable,
}

impl SanctionAmount {
    pub fn as_stored(&self) -> &str {
        match self {
            Self::Quantity(value) => value,
            Self::NotApplicable => "",
        }
    }

    pub fn from_stored(value: String) -> Self {
        if value.is_empty() {
            Self::NotApplicable
        } else {
            Self::Quantity(value)
        }
    }
}

/// One case carved out of a report, every field nullable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRecord {
    pub case_number: Option<String>,
    pub name: Option<String>,
    pub entity_type: Option<String>,
    pub date_known: Option<String>,
    pub action: Option<String>,
    pub sanction_amount: Option<SanctionAmount>,
    pub sanction: Option<String>,
    pub case_type: Option<String>,
    pub closed_date: Option<String>,
}

/// Extraction step at which carving stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    CaseNumber,
    EntityType,
    DateKnown,
    Sanction,
    ClosedDate,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CaseNumber => "case_number",
            Self::EntityType => "entity_type",
            Self::DateKnown => "date_known",
            Self::Sanction => "sanction",
            Self::ClosedDate => "closed_date",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub record: ExtractedRecord,
    pub stopped_at: Option<Stage>,
}

/// A segmented case together with what extraction made of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRow {
    pub record_index: usize,
    pub raw_text: String,
    pub extraction: Extraction,
}

/// Row of the final dataset. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    #[serde(rename = "CASE NUMBER")]
    pub case_number: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "ENTITY TYPE")]
    pub entity_type: String,
    #[serde(rename = "DATE KNOWN")]
    pub date_known: String,
    #[serde(rename = "ACTION")]
    pub action: String,
    #[serde(rename = "SANCTION AMOUNT")]
    pub sanction_amount: Option<f64>,
    #[serde(rename = "SANCTION")]
    pub sanction: String,
    #[serde(rename = "CASE TYPE")]
    pub case_type: String,
    #[serde(rename = "CLOSED DATE")]
    pub closed_date: String,
}

pub const CANONICAL_COLUMNS: [&str; 9] = [
    "CASE NUMBER",
    "NAME",
    "ENTITY TYPE",
    "DATE KNOWN",
    "ACTION",
    "SANCTION AMOUNT",
    "SANCTION",
    "CASE TYPE",
    "CLOSED DATE",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentEntry {
    pub doc_id: String,
    pub filename: String,
    pub quarter: u32,
    pub year: u32,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub start_year: u32,
    pub end_year: u32,
    pub document_count: usize,
    pub documents: Vec<DocumentEntry>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub pdftotext: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub cache_root: String,
    pub inventory_manifest_path: String,
    pub db_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractCounts {
    pub document_count: usize,
    pub processed_document_count: usize,
    pub failed_document_count: usize,
    pub lines_read: usize,
    pub records_segmented: usize,
    pub records_complete: usize,
    pub stopped_at_case_number: usize,
    pub stopped_at_entity_type: usize,
    pub stopped_at_date_known: usize,
    pub stopped_at_sanction: usize,
    pub stopped_at_closed_date: usize,
    pub records_total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub tool_versions: ToolVersions,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub source_hashes: Vec<DocumentEntry>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CleanCounts {
    pub rows_read: usize,
    pub rows_written: usize,
    pub dropped_missing_case_number: usize,
    pub dropped_incomplete: usize,
    pub amount_coercion_failures: usize,
    pub entity_type_aliases_applied: usize,
    pub action_aliases_applied: usize,
    pub sanction_aliases_applied: usize,
    pub case_type_aliases_applied: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub db_path: String,
    pub output_path: String,
    pub alias_tables: String,
    pub date_style: String,
    pub counts: CleanCounts,
}
