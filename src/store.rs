use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::model::{CaseRow, DocumentEntry, ExtractedRecord, SanctionAmount};
use crate::util::ensure_directory;

pub const DB_SCHEMA_VERSION: &str = "0.1.0";

pub fn open(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        ensure_directory(parent)?;
    }

    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
          doc_id TEXT PRIMARY KEY,
          filename TEXT NOT NULL,
          sha256 TEXT NOT NULL,
          quarter INTEGER NOT NULL,
          year INTEGER NOT NULL,
          record_count INTEGER NOT NULL DEFAULT 0,
          extracted_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS extracted_records (
          doc_id TEXT NOT NULL,
          record_index INTEGER NOT NULL,
          raw_text TEXT NOT NULL,
          case_number TEXT,
          name TEXT,
          entity_type TEXT,
          date_known TEXT,
          action TEXT,
          sanction_amount TEXT,
          sanction TEXT,
          case_type TEXT,
          closed_date TEXT,
          stopped_at TEXT,
          PRIMARY KEY(doc_id, record_index),
          FOREIGN KEY(doc_id) REFERENCES documents(doc_id)
        );

        CREATE INDEX IF NOT EXISTS idx_extracted_records_case_number
          ON extracted_records(case_number);
        ",
        )
        .context("failed to create store schema")?;

    connection
        .execute(
            "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![DB_SCHEMA_VERSION],
        )
        .context("failed to record schema version")?;

    Ok(())
}

/// Replaces everything stored for `document` with `rows`, so re-extracting a
/// report never leaves stale cases behind.
pub fn replace_document_rows(
    connection: &mut Connection,
    document: &DocumentEntry,
    extracted_at: &str,
    rows: &[CaseRow],
) -> Result<usize> {
    let tx = connection.transaction()?;

    tx.execute(
        "DELETE FROM extracted_records WHERE doc_id = ?1",
        params![&document.doc_id],
    )
    .with_context(|| format!("failed to clear records for {}", document.doc_id))?;

    tx.execute(
        "
        INSERT INTO documents(doc_id, filename, sha256, quarter, year, record_count, extracted_at)
        VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(doc_id) DO UPDATE SET
          filename=excluded.filename,
          sha256=excluded.sha256,
          quarter=excluded.quarter,
          year=excluded.year,
          record_count=excluded.record_count,
          extracted_at=excluded.extracted_at
        ",
        params![
            &document.doc_id,
            &document.filename,
            &document.sha256,
            document.quarter,
            document.year,
            rows.len() as i64,
            extracted_at
        ],
    )
    .with_context(|| format!("failed to upsert document {}", document.doc_id))?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO extracted_records(
              doc_id, record_index, raw_text, case_number, name, entity_type, date_known,
              action, sanction_amount, sanction, case_type, closed_date, stopped_at
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
        )?;

        for row in rows {
            let record = &row.extraction.record;
            statement
                .execute(params![
                    &document.doc_id,
                    row.record_index as i64,
                    &row.raw_text,
                    record.case_number,
                    record.name,
                    record.entity_type,
                    record.date_known,
                    record.action,
                    record.sanction_amount.as_ref().map(SanctionAmount::as_stored),
                    record.sanction,
                    record.case_type,
                    record.closed_date,
                    row.extraction.stopped_at.map(|stage| stage.as_str()),
                ])
                .with_context(|| {
                    format!(
                        "failed to insert record {} of {}",
                        row.record_index, document.doc_id
                    )
                })?;
        }
    }

    tx.commit()?;
    Ok(rows.len())
}

/// Every stored record, concatenated across documents in publication order.
pub fn load_records(connection: &Connection) -> Result<Vec<ExtractedRecord>> {
    let mut statement = connection.prepare(
        "
        SELECT r.case_number, r.name, r.entity_type, r.date_known, r.action,
               r.sanction_amount, r.sanction, r.case_type, r.closed_date
        FROM extracted_records r
        JOIN documents d ON d.doc_id = r.doc_id
        ORDER BY d.year, d.quarter, r.record_index
        ",
    )?;

    let rows = statement.query_map([], |row| {
        Ok(ExtractedRecord {
            case_number: row.get(0)?,
            name: row.get(1)?,
            entity_type: row.get(2)?,
            date_known: row.get(3)?,
            action: row.get(4)?,
            sanction_amount: row
                .get::<_, Option<String>>(5)?
                .map(SanctionAmount::from_stored),
            sanction: row.get(6)?,
            case_type: row.get(7)?,
            closed_date: row.get(8)?,
        })
    })?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read extracted records")
}

pub fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

pub fn schema_version(connection: &Connection) -> Result<Option<String>> {
    connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'db_schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read schema version")
}

/// Record counts grouped by the stage extraction stopped at; rows that ran
/// through every stage are reported as `complete`.
pub fn stop_counts(connection: &Connection) -> Result<Vec<(String, i64)>> {
    let mut statement = connection.prepare(
        "
        SELECT COALESCE(stopped_at, 'complete'), COUNT(*)
        FROM extracted_records
        GROUP BY stopped_at
        ORDER BY stopped_at
        ",
    )?;

    let rows = statement.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to count extraction stop stages")
}
