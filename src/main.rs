use clap::Parser;
use color_eyre::Result;
use hitrate::analysis::{run_analysis, AnalysisOptions, FilterSpec};
use hitrate::cli::Args;
use hitrate::columns::resolve_column;
use hitrate::report::write_report;
use hitrate::source::{load_table, resolve_files};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let files = resolve_files(&args.data_dir, args.files.as_deref())?;
    let options = AnalysisOptions {
        top_values: args.top_values,
        top_combos: args.top_combos,
        min_group_size: args.min_group_size,
    };

    for path in files {
        let df = load_table(&path, args.sheet.as_deref())?;

        // Tokens may be header names or spreadsheet letters; the engine only
        // ever sees resolved header names.
        let filter_col = resolve_column(&df, &args.filter_col)?;
        let analyze_cols = args
            .analyze_cols
            .iter()
            .map(|token| resolve_column(&df, token))
            .collect::<Result<Vec<_>>>()?;

        let spec = FilterSpec {
            column: filter_col,
            value: args.filter_val.clone(),
        };
        let result = run_analysis(&df, &spec, &analyze_cols, options)?;
        let report_path = write_report(&args.out_dir, &result, &path)?;
        println!("Report written: {}", report_path.display());
    }

    Ok(())
}
