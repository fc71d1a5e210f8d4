use clap::Parser;
use std::path::PathBuf;

/// Command line arguments.
///
/// The analysis itself has no other configuration surface; everything the
/// engine needs arrives through these options.
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Filter hit-rate reports for CSV/Excel data: share of filter matches per column value plus top value combinations, written as Markdown"
)]
pub struct Args {
    /// Directory containing the input files
    #[arg(long = "data-dir", default_value = "data")]
    pub data_dir: PathBuf,

    /// Analyze only these files inside the data directory
    /// (default: every supported file in the directory)
    #[arg(long = "files", num_args = 1..)]
    pub files: Option<Vec<String>>,

    /// Excel sheet name or 0-based index (default: first sheet)
    #[arg(long = "sheet")]
    pub sheet: Option<String>,

    /// Column to filter on: a header name or spreadsheet letters like "AC"
    #[arg(long = "filter-col")]
    pub filter_col: String,

    /// Filter value: an empty token (leer/empty/blank/null/none), a
    /// not-empty token (nichtleer/notempty), or an exact value to match
    #[arg(long = "filter-val")]
    pub filter_val: String,

    /// Columns to analyze; order matters for the combination levels
    #[arg(long = "analyze-cols", num_args = 1.., required = true)]
    pub analyze_cols: Vec<String>,

    /// Report at most this many values per column
    #[arg(long = "top-values", default_value_t = 30)]
    pub top_values: usize,

    /// Report at most this many combinations per level
    #[arg(long = "top-combos", default_value_t = 10)]
    pub top_combos: usize,

    /// Drop value groups smaller than this
    #[arg(long = "min-group-size", default_value_t = 1)]
    pub min_group_size: usize,

    /// Directory the Markdown reports are written to
    #[arg(long = "out-dir", default_value = "output")]
    pub out_dir: PathBuf,
}
