//! Core engine: filter-mask construction, per-column value statistics, and
//! progressive column-combination statistics over an in-memory DataFrame.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Filter expressions (lower-cased, trimmed) that select empty cells.
const EMPTY_TOKENS: &[&str] = &["", "leer", "empty", "blank", "null", "none"];

/// Filter expressions that select non-empty cells.
const NOT_EMPTY_TOKENS: &[&str] = &["nichtleer", "notempty", "not_empty"];

/// Display label for the empty value group.
pub const EMPTY_LABEL: &str = "<EMPTY>";

/// Which column to filter on and against what expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSpec {
    pub column: String,
    pub value: String,
}

impl FilterSpec {
    pub fn describe(&self) -> String {
        format!("{} = {}", self.column, self.value)
    }
}

/// One distinct normalized value within one analysis column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueStats {
    pub value: String,
    pub total: usize,
    pub matched: usize,
}

impl ValueStats {
    pub fn pct(&self) -> f64 {
        percentage(self.matched, self.total)
    }
}

/// Per-value statistics for one analysis column, best-first.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnAnalysis {
    pub column: String,
    pub stats: Vec<ValueStats>,
}

/// One value tuple over the first k analysis columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboRow {
    pub columns: Vec<String>,
    pub values: Vec<String>,
    pub total: usize,
    pub matched: usize,
}

impl ComboRow {
    pub fn pct(&self) -> f64 {
        percentage(self.matched, self.total)
    }

    /// Human-readable `column=value` pairs in column order. Display only.
    pub fn label(&self) -> String {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| format!("{}={}", c, v))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Top combinations for one prefix of the analysis-column list.
#[derive(Clone, Debug, PartialEq)]
pub struct ComboAnalysis {
    pub columns: Vec<String>,
    pub top: Vec<ComboRow>,
}

/// Everything the report renderer needs for one input file.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub file_rows: usize,
    pub filter_spec: FilterSpec,
    pub filter_matched_total: usize,
    pub filter_matched_pct: f64,
    pub per_column: Vec<ColumnAnalysis>,
    pub combos: Vec<ComboAnalysis>,
}

/// Tunables for one analysis run.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisOptions {
    /// Cap on reported values per column.
    pub top_values: usize,
    /// Cap on reported combinations per prefix level.
    pub top_combos: usize,
    /// Groups smaller than this are dropped.
    pub min_group_size: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_values: 30,
            top_combos: 10,
            min_group_size: 1,
        }
    }
}

fn percentage(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * matched as f64 / total as f64
    }
}

/// Normalizes a cell for comparison and grouping: null and float NaN become
/// the empty string, everything else is its string form with surrounding
/// whitespace trimmed. Internal whitespace is left alone.
fn normalize_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(f) if f.is_nan() => String::new(),
        AnyValue::Float32(f) if f.is_nan() => String::new(),
        other => other.str_value().trim().to_string(),
    }
}

/// Reads one column as normalized strings, aligned with row index.
fn column_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = df.column(name)?.as_materialized_series();
    Ok(series.iter().map(|v| normalize_cell(&v)).collect())
}

/// Checks that every name exists in the DataFrame, collecting all missing
/// names into a single error instead of failing on the first.
pub fn validate_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    let present = df.get_column_names();
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| !present.iter().any(|p| p.as_str() == *n))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(eyre!("Columns not found in data: {}", missing.join(", ")))
    }
}

/// Builds the per-row boolean mask for a filter spec.
///
/// The filter expression is trimmed and lower-cased, then matched in priority
/// order: empty token, not-empty token, exact (case-folded) value equality.
pub fn build_filter_mask(df: &DataFrame, spec: &FilterSpec) -> Result<Vec<bool>> {
    if !df
        .get_column_names()
        .iter()
        .any(|n| n.as_str() == spec.column)
    {
        return Err(eyre!("Filter column not found: {}", spec.column));
    }
    let values = column_values(df, &spec.column)?;
    let expr = spec.value.trim().to_lowercase();

    let mask = if EMPTY_TOKENS.contains(&expr.as_str()) {
        values.iter().map(|v| v.is_empty()).collect()
    } else if NOT_EMPTY_TOKENS.contains(&expr.as_str()) {
        values.iter().map(|v| !v.is_empty()).collect()
    } else {
        values.iter().map(|v| v.to_lowercase() == expr).collect()
    };
    Ok(mask)
}

/// Per-column value statistics: group rows by normalized value, count total
/// and matched, drop groups under `min_group_size`, rank by (pct desc,
/// matched desc, total desc) and cap at `top_values`.
///
/// The `<EMPTY>` label is applied only when emitting stats; grouping itself
/// uses the empty string as a key like any other value.
pub fn analyze_columns(
    df: &DataFrame,
    mask: &[bool],
    columns: &[String],
    top_values: usize,
    min_group_size: usize,
) -> Result<Vec<ColumnAnalysis>> {
    let mut results = Vec::with_capacity(columns.len());
    for column in columns {
        let values = column_values(df, column)?;
        // BTreeMap keeps the pre-sort order deterministic regardless of input order
        let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for (value, &hit) in values.iter().zip(mask) {
            let entry = groups.entry(value.as_str()).or_default();
            entry.0 += 1;
            if hit {
                entry.1 += 1;
            }
        }
        let mut stats: Vec<ValueStats> = groups
            .into_iter()
            .filter(|(_, (total, _))| *total >= min_group_size)
            .map(|(value, (total, matched))| ValueStats {
                value: if value.is_empty() {
                    EMPTY_LABEL.to_string()
                } else {
                    value.to_string()
                },
                total,
                matched,
            })
            .collect();
        stats.sort_by(|a, b| {
            b.pct()
                .partial_cmp(&a.pct())
                .unwrap_or(Ordering::Equal)
                .then(b.matched.cmp(&a.matched))
                .then(b.total.cmp(&a.total))
        });
        stats.truncate(top_values);
        results.push(ColumnAnalysis {
            column: column.clone(),
            stats,
        });
    }
    Ok(results)
}

/// Combination statistics for every prefix of the analysis-column list.
///
/// For k = 1..=len, rows are grouped by the tuple of the first k column
/// values. Only progressive prefixes are examined, never all k-subsets, so
/// column order matters. Ranking is (matched desc, total desc) with no pct
/// term: the point is frequent constellations, not high-rate small groups.
///
/// Unlike the per-column case, empty values are replaced with `<EMPTY>`
/// before grouping, so a literal `<EMPTY>` cell would merge with them here
/// but not there. Intentional; see the tests.
pub fn analyze_combos(
    df: &DataFrame,
    mask: &[bool],
    columns: &[String],
    top_combos: usize,
    min_group_size: usize,
) -> Result<Vec<ComboAnalysis>> {
    let normalized: Vec<Vec<String>> = columns
        .iter()
        .map(|column| {
            column_values(df, column).map(|values| {
                values
                    .into_iter()
                    .map(|v| if v.is_empty() { EMPTY_LABEL.to_string() } else { v })
                    .collect()
            })
        })
        .collect::<Result<_>>()?;

    let mut combos = Vec::with_capacity(columns.len());
    for k in 1..=columns.len() {
        let mut groups: BTreeMap<Vec<&str>, (usize, usize)> = BTreeMap::new();
        for (row, &hit) in mask.iter().enumerate() {
            let key: Vec<&str> = normalized[..k].iter().map(|c| c[row].as_str()).collect();
            let entry = groups.entry(key).or_default();
            entry.0 += 1;
            if hit {
                entry.1 += 1;
            }
        }
        let mut top: Vec<ComboRow> = groups
            .into_iter()
            .filter(|(_, (total, _))| *total >= min_group_size)
            .map(|(values, (total, matched))| ComboRow {
                columns: columns[..k].to_vec(),
                values: values.into_iter().map(String::from).collect(),
                total,
                matched,
            })
            .collect();
        top.sort_by(|a, b| b.matched.cmp(&a.matched).then(b.total.cmp(&a.total)));
        top.truncate(top_combos);
        combos.push(ComboAnalysis {
            columns: columns[..k].to_vec(),
            top,
        });
    }
    Ok(combos)
}

/// Runs one full analysis: validates columns, builds the mask once, and
/// drives both aggregators against it. Pure; no I/O.
pub fn run_analysis(
    df: &DataFrame,
    spec: &FilterSpec,
    analyze_cols: &[String],
    options: AnalysisOptions,
) -> Result<AnalysisResult> {
    let mut wanted: Vec<&str> = vec![spec.column.as_str()];
    wanted.extend(analyze_cols.iter().map(String::as_str));
    validate_columns(df, &wanted)?;

    let mask = build_filter_mask(df, spec)?;
    let per_column = analyze_columns(
        df,
        &mask,
        analyze_cols,
        options.top_values,
        options.min_group_size,
    )?;
    let combos = analyze_combos(
        df,
        &mask,
        analyze_cols,
        options.top_combos,
        options.min_group_size,
    )?;

    let file_rows = df.height();
    let filter_matched_total = mask.iter().filter(|&&hit| hit).count();
    Ok(AnalysisResult {
        file_rows,
        filter_spec: spec.clone(),
        filter_matched_total,
        filter_matched_pct: percentage(filter_matched_total, file_rows),
        per_column,
        combos,
    })
}
