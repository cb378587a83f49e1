use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::fields::RecordExtractor;
use super::segment::LineSegmenter;
use super::text_layer::{collect_tool_versions, extract_lines_with_pdftotext};
use crate::cli::ExtractArgs;
use crate::commands::inventory;
use crate::model::{CaseRow, ExtractCounts, ExtractPaths, ExtractRunManifest, Stage};
use crate::store;
use crate::util::{
    INVENTORY_MANIFEST_NAME, default_db_path, ensure_directory, manifest_dir, now_utc_string,
    utc_compact_string, write_json_pretty,
};

#[derive(Debug, Default)]
pub(super) struct DocumentExtraction {
    pub lines_read: usize,
    pub rows: Vec<CaseRow>,
}

pub fn run(args: ExtractArgs) -> Result<ExtractRunManifest> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("extract-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = manifest_dir(&cache_root);
    ensure_directory(&manifest_dir)?;

    let inventory_manifest_path = args
        .inventory_manifest_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join(INVENTORY_MANIFEST_NAME));
    let extract_manifest_path = args.extract_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "extract_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let db_path = default_db_path(&cache_root, args.db_path.as_ref());

    info!(cache_root = %cache_root.display(), run_id = %run_id, "starting extract");

    let inventory = inventory::load_or_refresh(
        &cache_root,
        &args.grid,
        &inventory_manifest_path,
        args.refresh_inventory,
    )?;
    let source_directory = Path::new(&inventory.source_directory);

    let tool_versions = collect_tool_versions();
    let mut connection = store::open(&db_path)?;

    let segmenter = LineSegmenter::new()?;
    let extractor = RecordExtractor::new()?;

    let mut counts = ExtractCounts {
        document_count: inventory.document_count,
        ..ExtractCounts::default()
    };
    let mut warnings = Vec::<String>::new();

    for document in &inventory.documents {
        let pdf_path = source_directory.join(&document.filename);
        let lines = match extract_lines_with_pdftotext(&pdf_path, args.max_pages_per_doc) {
            Ok(lines) => lines,
            Err(error) => {
                warn!(doc_id = %document.doc_id, error = %error, "text conversion failed, skipping");
                warnings.push(format!("{}: {error:#}", document.filename));
                counts.failed_document_count += 1;
                continue;
            }
        };

        let extraction = extract_document(&segmenter, &extractor, &lines);
        store::replace_document_rows(
            &mut connection,
            document,
            &now_utc_string(),
            &extraction.rows,
        )?;

        tally(&mut counts, &extraction);
        counts.processed_document_count += 1;

        info!(
            doc_id = %document.doc_id,
            lines = extraction.lines_read,
            records = extraction.rows.len(),
            "extracted document"
        );
    }

    counts.records_total = store::count_rows(&connection, "SELECT COUNT(*) FROM extracted_records")?;

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        db_schema_version: store::DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        tool_versions,
        paths: ExtractPaths {
            cache_root: cache_root.display().to_string(),
            inventory_manifest_path: inventory_manifest_path.display().to_string(),
            db_path: db_path.display().to_string(),
        },
        counts,
        source_hashes: inventory.documents,
        warnings,
    };

    write_json_pretty(&extract_manifest_path, &manifest)?;
    info!(path = %extract_manifest_path.display(), "wrote extract manifest");
    info!(
        processed = manifest.counts.processed_document_count,
        failed = manifest.counts.failed_document_count,
        records = manifest.counts.records_segmented,
        complete = manifest.counts.records_complete,
        "extract completed"
    );

    Ok(manifest)
}

/// Segments one document's lines and extracts every case independently.
pub(super) fn extract_document(
    segmenter: &LineSegmenter,
    extractor: &RecordExtractor,
    lines: &[String],
) -> DocumentExtraction {
    let rows = segmenter
        .segment(lines.iter().map(String::as_str))
        .into_iter()
        .enumerate()
        .map(|(record_index, raw_text)| {
            let extraction = extractor.extract(&raw_text);
            if let Some(stage) = extraction.stopped_at {
                debug!(record_index, stage = stage.as_str(), text = %raw_text, "extraction stopped early");
            }
            CaseRow {
                record_index,
                raw_text,
                extraction,
            }
        })
        .collect();

    DocumentExtraction {
        lines_read: lines.len(),
        rows,
    }
}

fn tally(counts: &mut ExtractCounts, extraction: &DocumentExtraction) {
    counts.lines_read += extraction.lines_read;
    counts.records_segmented += extraction.rows.len();

    for row in &extraction.rows {
        match row.extraction.stopped_at {
            None => counts.records_complete += 1,
            Some(Stage::CaseNumber) => counts.stopped_at_case_number += 1,
            Some(Stage::EntityType) => counts.stopped_at_entity_type += 1,
            Some(Stage::DateKnown) => counts.stopped_at_date_known += 1,
            Some(Stage::Sanction) => counts.stopped_at_sanction += 1,
            Some(Stage::ClosedDate) => counts.stopped_at_closed_date += 1,
        }
    }
}
