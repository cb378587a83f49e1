use anyhow::{Result, bail};
use chrono::Utc;
use tracing::info;

use super::aliases::{AliasTables, CategoricalNormalizer};
use super::cleaner::Cleaner;
use super::output::write_canonical_csv;
use crate::cli::CleanArgs;
use crate::model::CleanRunManifest;
use crate::store;
use crate::util::{
    FINAL_CSV_NAME, default_db_path, ensure_directory, manifest_dir, now_utc_string,
    utc_compact_string, write_json_pretty,
};

pub fn run(args: CleanArgs) -> Result<CleanRunManifest> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("clean-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = manifest_dir(&cache_root);
    ensure_directory(&manifest_dir)?;

    let db_path = default_db_path(&cache_root, args.db_path.as_ref());
    let output_path = args
        .output_path
        .clone()
        .unwrap_or_else(|| cache_root.join(FINAL_CSV_NAME));
    let clean_manifest_path = args.clean_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!("clean_run_{}.json", utc_compact_string(started_ts)))
    });

    if !db_path.exists() {
        bail!(
            "extraction store {} does not exist; run `enforcement extract` first",
            db_path.display()
        );
    }

    info!(db_path = %db_path.display(), run_id = %run_id, "starting clean");

    let tables = AliasTables::load(args.alias_tables.as_deref())?;
    let cleaner = Cleaner::new(CategoricalNormalizer::new(tables), args.date_style);

    let connection = store::open(&db_path)?;
    let records = store::load_records(&connection)?;
    let outcome = cleaner.clean(records);

    write_canonical_csv(&output_path, &outcome.records)?;
    info!(
        path = %output_path.display(),
        rows = outcome.records.len(),
        "wrote canonical dataset"
    );

    let manifest = CleanRunManifest {
        manifest_version: 1,
        run_id,
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        db_path: db_path.display().to_string(),
        output_path: output_path.display().to_string(),
        alias_tables: args
            .alias_tables
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        date_style: args.date_style.as_str().to_string(),
        counts: outcome.counts,
    };

    write_json_pretty(&clean_manifest_path, &manifest)?;
    info!(path = %clean_manifest_path.display(), "wrote clean manifest");
    info!(
        rows_read = manifest.counts.rows_read,
        rows_written = manifest.counts.rows_written,
        dropped_incomplete = manifest.counts.dropped_incomplete,
        amount_coercion_failures = manifest.counts.amount_coercion_failures,
        "clean completed"
    );

    Ok(manifest)
}
