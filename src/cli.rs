use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "enforcement",
    version,
    about = "Enforcement case report extraction and cleaning tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Extract(ExtractArgs),
    Clean(CleanArgs),
    Run(RunArgs),
    Status(StatusArgs),
}

/// Year×quarter grid the source reports are published on.
#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Directory holding `q{n}-{yy}.pdf` reports; defaults to `<cache-root>/raw`.
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 2010)]
    pub start_year: u32,

    #[arg(long, default_value_t = 2024)]
    pub end_year: u32,
}

impl GridArgs {
    pub fn raw_dir_for(&self, cache_root: &Path) -> PathBuf {
        self.raw_dir
            .clone()
            .unwrap_or_else(|| cache_root.join("raw"))
    }
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = ".cache/enforcement")]
    pub cache_root: PathBuf,

    #[command(flatten)]
    pub grid: GridArgs,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = ".cache/enforcement")]
    pub cache_root: PathBuf,

    #[command(flatten)]
    pub grid: GridArgs,

    #[arg(long)]
    pub inventory_manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub extract_manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub refresh_inventory: bool,

    #[arg(long)]
    pub max_pages_per_doc: Option<usize>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DateStyle {
    /// Keep the `mm/dd/yy` shape produced by extraction.
    Canonical,
    /// Re-render dates as `YYYY-MM-DD`; unparsable dates become missing.
    Iso,
}

impl DateStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Iso => "iso",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    #[arg(long, default_value = ".cache/enforcement")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub output_path: Option<PathBuf>,

    #[arg(long)]
    pub clean_manifest_path: Option<PathBuf>,

    /// JSON alias tables replacing the built-in ones.
    #[arg(long)]
    pub alias_tables: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DateStyle::Canonical)]
    pub date_style: DateStyle,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = ".cache/enforcement")]
    pub cache_root: PathBuf,

    #[command(flatten)]
    pub grid: GridArgs,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub refresh_inventory: bool,

    #[arg(long)]
    pub max_pages_per_doc: Option<usize>,

    #[arg(long)]
    pub output_path: Option<PathBuf>,

    #[arg(long)]
    pub alias_tables: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DateStyle::Canonical)]
    pub date_style: DateStyle,
}

impl RunArgs {
    pub fn extract_args(&self) -> ExtractArgs {
        ExtractArgs {
            cache_root: self.cache_root.clone(),
            grid: self.grid.clone(),
            inventory_manifest_path: None,
            extract_manifest_path: None,
            db_path: self.db_path.clone(),
            refresh_inventory: self.refresh_inventory,
            max_pages_per_doc: self.max_pages_per_doc,
        }
    }

    pub fn clean_args(&self) -> CleanArgs {
        CleanArgs {
            cache_root: self.cache_root.clone(),
            db_path: self.db_path.clone(),
            output_path: self.output_path.clone(),
            clean_manifest_path: None,
            alias_tables: self.alias_tables.clone(),
            date_style: self.date_style,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/enforcement")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
