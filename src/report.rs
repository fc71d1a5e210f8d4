//! Markdown report rendering and output file handling.

use chrono::Local;
use color_eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisResult, ColumnAnalysis, ComboAnalysis};

/// Report file name derived from the input file's base name.
pub fn report_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    format!("{}_report.md", stem)
}

/// Renders the report and writes it under `out_dir`, creating directories
/// as needed. Returns the written path.
pub fn write_report(out_dir: &Path, result: &AnalysisResult, source: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(report_file_name(source));
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let body = render_report(result, &source.display().to_string(), &generated_at);
    fs::write(&path, body)?;
    Ok(path)
}

/// Renders one AnalysisResult as a Markdown document.
pub fn render_report(result: &AnalysisResult, source: &str, generated_at: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# Filter hit-rate report".to_string());
    lines.push(String::new());
    lines.push(format!("- **Generated:** {}", generated_at));
    lines.push(format!("- **Source:** `{}`", source));
    lines.push(format!("- **Rows:** {}", result.file_rows));
    lines.push(format!("- **Filter:** `{}`", result.filter_spec.describe()));
    lines.push(format!(
        "- **Filter matches:** {} ({:.2}%)",
        result.filter_matched_total, result.filter_matched_pct
    ));
    lines.push(String::new());

    lines.push("## 1. Filter share per column value".to_string());
    lines.push(String::new());
    lines.push(
        "For each value of an analysis column: how often the filter matches within that value group."
            .to_string(),
    );
    lines.push(String::new());
    for column in &result.per_column {
        render_column(&mut lines, column);
    }

    lines.push("## 2. Most frequent constellations (top combinations)".to_string());
    lines.push(String::new());
    lines.push(
        "Ranked by match count: how often the combination occurs among the filtered rows."
            .to_string(),
    );
    lines.push(String::new());
    for combo in &result.combos {
        render_combo(&mut lines, combo);
    }

    lines.join("\n")
}

fn render_column(lines: &mut Vec<String>, column: &ColumnAnalysis) {
    lines.push(format!("### Column: `{}`", column.column));
    lines.push(String::new());
    if column.stats.is_empty() {
        lines.push("_No groups to report (min group size may be too high)._".to_string());
        lines.push(String::new());
        return;
    }
    lines.push("| Value | Rows | Matches | Match % |".to_string());
    lines.push("| --- | ---: | ---: | ---: |".to_string());
    for s in &column.stats {
        lines.push(format!(
            "| {} | {} | {} | {:.2}% |",
            escape_markdown(&s.value),
            s.total,
            s.matched,
            s.pct()
        ));
    }
    lines.push(String::new());
}

fn render_combo(lines: &mut Vec<String>, combo: &ComboAnalysis) {
    lines.push(format!("### Combination: `{}`", combo.columns.join(", ")));
    lines.push(String::new());
    if combo.top.is_empty() {
        lines.push("_No combinations found._".to_string());
        lines.push(String::new());
        return;
    }
    lines.push("| Combination | Rows | Matches | Match % |".to_string());
    lines.push("| --- | ---: | ---: | ---: |".to_string());
    for row in &combo.top {
        lines.push(format!(
            "| {} | {} | {} | {:.2}% |",
            escape_markdown(&row.label()),
            row.total,
            row.matched,
            row.pct()
        ));
    }
    lines.push(String::new());
}

/// Escapes untrusted cell text for use inside a Markdown table.
/// `&` first so the later replacements are not double-escaped; `|` last
/// because it would break the table structure.
pub fn escape_markdown(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('|', "\\|")
}
