pub mod analysis;
pub mod cli;
pub mod columns;
pub mod report;
pub mod source;

pub use analysis::{run_analysis, AnalysisOptions, AnalysisResult, FilterSpec};
pub use cli::Args;
pub use columns::resolve_column;
pub use report::write_report;
pub use source::{load_table, resolve_files};
