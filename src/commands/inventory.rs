use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::{GridArgs, InventoryArgs};
use crate::model::{DocumentEntry, DocumentInventoryManifest};
use crate::util::{
    INVENTORY_MANIFEST_NAME, manifest_dir, now_utc_string, sha256_file, write_json_pretty,
};

pub fn run(args: InventoryArgs) -> Result<()> {
    let raw_dir = args.grid.raw_dir_for(&args.cache_root);
    let manifest = build_manifest(&raw_dir, args.grid.start_year, args.grid.end_year)?;

    if args.dry_run {
        info!(
            document_count = manifest.document_count,
            missing = manifest.missing.len(),
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| manifest_dir(&args.cache_root).join(INVENTORY_MANIFEST_NAME));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(document_count = manifest.document_count, "inventory completed");

    Ok(())
}

/// Looks for one report per quarter of every year in `start_year..=end_year`.
/// Missing quarters are logged and listed but do not fail the inventory.
pub fn build_manifest(
    raw_dir: &Path,
    start_year: u32,
    end_year: u32,
) -> Result<DocumentInventoryManifest> {
    if start_year > end_year {
        bail!("start year {start_year} is after end year {end_year}");
    }

    let mut documents = Vec::new();
    let mut missing = Vec::new();

    for year in start_year..=end_year {
        for quarter in 1..=4 {
            let filename = report_filename(quarter, year);
            let path = raw_dir.join(&filename);

            if !path.is_file() {
                warn!(file = %filename, "report not found, skipping");
                missing.push(filename);
                continue;
            }

            let sha256 = sha256_file(&path)?;
            documents.push(DocumentEntry {
                doc_id: doc_id_for(quarter, year),
                filename,
                quarter,
                year,
                sha256,
            });
        }
    }

    if documents.is_empty() {
        bail!(
            "no reports found in {} for {}..={}",
            raw_dir.display(),
            start_year,
            end_year
        );
    }

    Ok(DocumentInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: raw_dir.display().to_string(),
        start_year,
        end_year,
        document_count: documents.len(),
        documents,
        missing,
    })
}

pub fn load_or_refresh(
    cache_root: &Path,
    grid: &GridArgs,
    inventory_manifest_path: &Path,
    refresh_inventory: bool,
) -> Result<DocumentInventoryManifest> {
    if refresh_inventory || !inventory_manifest_path.exists() {
        let raw_dir = grid.raw_dir_for(cache_root);
        let manifest = build_manifest(&raw_dir, grid.start_year, grid.end_year)?;
        write_json_pretty(inventory_manifest_path, &manifest)?;
        info!(
            path = %inventory_manifest_path.display(),
            document_count = manifest.document_count,
            "refreshed inventory manifest"
        );
        return Ok(manifest);
    }

    let raw = fs::read(inventory_manifest_path)
        .with_context(|| format!("failed to read {}", inventory_manifest_path.display()))?;
    let manifest: DocumentInventoryManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", inventory_manifest_path.display()))?;

    info!(
        path = %inventory_manifest_path.display(),
        document_count = manifest.document_count,
        "loaded existing inventory manifest"
    );

    Ok(manifest)
}

/// Reports are published as `q{quarter}-{yy}.pdf`.
pub fn report_filename(quarter: u32, year: u32) -> String {
    format!("q{quarter}-{:02}.pdf", year % 100)
}

pub fn doc_id_for(quarter: u32, year: u32) -> String {
    format!("q{quarter}_{year}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_filename_uses_two_digit_year() {
        assert_eq!(report_filename(1, 2010), "q1-10.pdf");
        assert_eq!(report_filename(4, 2009), "q4-09.pdf");
        assert_eq!(doc_id_for(3, 2024), "q3_2024");
    }

    #[test]
    fn build_manifest_walks_year_quarter_grid_and_records_gaps() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("q1-10.pdf"), b"%PDF-1.4 first").expect("write q1");
        fs::write(dir.path().join("q3-11.pdf"), b"%PDF-1.4 second").expect("write q3");
        fs::write(dir.path().join("q2-12.pdf"), b"outside grid").expect("write q2");

        let manifest = build_manifest(dir.path(), 2010, 2011).expect("manifest builds");

        assert_eq!(manifest.document_count, 2);
        assert_eq!(manifest.documents[0].doc_id, "q1_2010");
        assert_eq!(manifest.documents[1].doc_id, "q3_2011");
        assert_eq!(manifest.documents[1].quarter, 3);
        assert_eq!(manifest.documents[1].sha256.len(), 64);
        assert_eq!(manifest.missing.len(), 6);
        assert!(manifest.missing.contains(&"q4-11.pdf".to_string()));
    }

    #[test]
    fn build_manifest_rejects_empty_grid_and_inverted_range() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(build_manifest(dir.path(), 2010, 2010).is_err());
        assert!(build_manifest(dir.path(), 2012, 2010).is_err());
    }
}
