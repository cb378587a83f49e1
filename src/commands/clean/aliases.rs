use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const EMBEDDED_ALIAS_TABLES: &str = include_str!("aliases.json");

/// The four category columns that carry alias tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    EntityType,
    Action,
    Sanction,
    CaseType,
}

impl CategoryField {
    pub const ALL: [CategoryField; 4] = [
        Self::EntityType,
        Self::Action,
        Self::Sanction,
        Self::CaseType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EntityType => "entity_type",
            Self::Action => "action",
            Self::Sanction => "sanction",
            Self::CaseType => "case_type",
        }
    }
}

/// Hand-curated `observed spelling -> canonical value` tables.
///
/// Keys are stored folded (upper case, trimmed) since lookups fold first.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasTables {
    pub entity_type: BTreeMap<String, String>,
    pub action: BTreeMap<String, String>,
    pub sanction: BTreeMap<String, String>,
    pub case_type: BTreeMap<String, String>,
}

impl AliasTables {
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_ALIAS_TABLES).context("failed to parse built-in alias tables")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    pub(super) fn parse(raw: &str) -> Result<Self> {
        let tables: Self = serde_json::from_str(raw)?;
        for field in CategoryField::ALL {
            for key in tables.table(field).keys() {
                if fold(key) != *key {
                    bail!(
                        "{} alias '{}' is not upper case and trimmed, it can never match",
                        field.as_str(),
                        key
                    );
                }
            }
        }
        Ok(tables)
    }

    pub fn table(&self, field: CategoryField) -> &BTreeMap<String, String> {
        match field {
            CategoryField::EntityType => &self.entity_type,
            CategoryField::Action => &self.action,
            CategoryField::Sanction => &self.sanction,
            CategoryField::CaseType => &self.case_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub value: String,
    pub aliased: bool,
}

/// Maps alias spellings of the category columns to their canonical values.
/// Values without an alias come back folded but otherwise untouched.
#[derive(Debug, Clone)]
pub struct CategoricalNormalizer {
    tables: AliasTables,
}

impl CategoricalNormalizer {
    pub fn new(tables: AliasTables) -> Self {
        Self { tables }
    }

    pub fn normalize(&self, field: CategoryField, value: &str) -> Normalized {
        let folded = fold(value);
        match self.tables.table(field).get(&folded) {
            Some(canonical) => Normalized {
                value: canonical.clone(),
                aliased: true,
            },
            None => Normalized {
                value: folded,
                aliased: false,
            },
        }
    }
}

pub fn fold(value: &str) -> String {
    value.trim().to_uppercase()
}
