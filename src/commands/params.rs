use std::path::PathBuf;

use clap::Args;

use crate::export::ExportFormat;
use crate::geography::{ConfidenceLevel, PlaceType};
use crate::scripture::Translation;
use crate::search::FilterSet;

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Translations to search, comma-separated (e.g. "kjv,web")
    #[arg(short, long, value_delimiter = ',', default_value = "kjv")]
    pub translations: Vec<Translation>,
    /// Maximum results per translation (1-100)
    #[arg(short = 'k', long, default_value_t = 10)]
    pub limit: usize,
}

impl FilterArgs {
    pub fn filter_set(&self) -> FilterSet {
        FilterSet::new(self.translations.iter().copied(), self.limit)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Also write the results to a file in this format
    #[arg(short = 'x', long, value_enum)]
    pub export: Option<ExportFormat>,
    /// Directory for exported files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search query (at least 3 characters)
    pub query: String,
    #[command(flatten)]
    pub filters: FilterArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Directory for files written with `:x`
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct PlacesArgs {
    /// Only places of this type (bypasses the cached listing)
    #[arg(long, value_enum)]
    pub place_type: Option<PlaceType>,
    /// Only places identified with this confidence (bypasses the cached listing)
    #[arg(long, value_enum)]
    pub confidence: Option<ConfidenceLevel>,
}

#[derive(Args, Debug, Clone)]
pub struct OriginalArgs {
    /// Verse reference, e.g. "Genesis 1:1" or "Ps 23:1"
    pub reference: String,
}

#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Prism document id
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct DocumentsArgs {
    /// Domain to list (e.g. "bible/kjv", "geography")
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Deep link: full URL, "?q=..." query string, or bare "q=...&book=..."
    pub link: String,
    #[command(flatten)]
    pub export: ExportArgs,
}
