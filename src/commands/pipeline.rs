use anyhow::Result;
use tracing::info;

use crate::cli::RunArgs;
use crate::commands::{clean, extract};

/// Extraction followed by cleaning over the same store.
pub fn run(args: RunArgs) -> Result<()> {
    let extract_manifest = extract::run(args.extract_args())?;
    info!(
        run_id = %extract_manifest.run_id,
        records = extract_manifest.counts.records_total,
        "extract phase finished"
    );

    let clean_manifest = clean::run(args.clean_args())?;
    info!(
        run_id = %clean_manifest.run_id,
        rows_written = clean_manifest.counts.rows_written,
        output_path = %clean_manifest.output_path,
        "pipeline completed"
    );

    Ok(())
}
