use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::model::{CANONICAL_COLUMNS, CanonicalRecord};
use crate::util::ensure_directory;

pub fn write_canonical_csv(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    write_canonical_records(file, records)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Writes the fixed header followed by one line per record. The header is
/// written even when no record survived cleaning.
pub fn write_canonical_records<W: Write>(sink: W, records: &[CanonicalRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(sink);

    writer
        .write_record(CANONICAL_COLUMNS)
        .context("failed to write csv header")?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to write case {}", record.case_number))?;
    }
    writer.flush().context("failed to flush csv output")?;

    Ok(())
}
