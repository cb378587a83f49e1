use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::DocumentInventoryManifest;
use crate::store;
use crate::util::{FINAL_CSV_NAME, INVENTORY_MANIFEST_NAME, default_db_path, manifest_dir};

pub fn run(args: StatusArgs) -> Result<()> {
    let inventory_path = manifest_dir(&args.cache_root).join(INVENTORY_MANIFEST_NAME);
    let db_path = default_db_path(&args.cache_root, args.db_path.as_ref());
    let output_path = args.cache_root.join(FINAL_CSV_NAME);

    info!(cache_root = %args.cache_root.display(), "status requested");

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: DocumentInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            start_year = inventory.start_year,
            end_year = inventory.end_year,
            document_count = inventory.document_count,
            missing = inventory.missing.len(),
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    if db_path.exists() {
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let documents = store::count_rows(&conn, "SELECT COUNT(*) FROM documents").unwrap_or(0);
        let records =
            store::count_rows(&conn, "SELECT COUNT(*) FROM extracted_records").unwrap_or(0);
        let schema_version = store::schema_version(&conn)
            .ok()
            .flatten()
            .unwrap_or_default();

        info!(
            path = %db_path.display(),
            schema_version = %schema_version,
            documents,
            records,
            "database status"
        );

        for (stage, count) in store::stop_counts(&conn).unwrap_or_default() {
            info!(stage = %stage, records = count, "extraction stop stage");
        }
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    if output_path.exists() {
        info!(path = %output_path.display(), "canonical dataset present");
    } else {
        warn!(path = %output_path.display(), "canonical dataset missing");
    }

    Ok(())
}
