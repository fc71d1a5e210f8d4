//! Input discovery and table loading for local CSV and Excel files.

use calamine::{open_workbook_auto, Data, Reader};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions the loader accepts, case-insensitive.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xls", "xlsx"];

enum ExcelColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Every supported file directly in `dir`, sorted case-insensitively by name.
pub fn list_supported_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(eyre!("Data directory not found: {}", dir.display()));
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    files.sort_by_key(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(files)
}

/// Resolves the set of input files for one run.
///
/// With no explicit names, every supported file in `dir` is used (an empty
/// directory is an error). Explicit names must exist in `dir` and carry a
/// supported extension.
pub fn resolve_files(dir: &Path, names: Option<&[String]>) -> Result<Vec<PathBuf>> {
    match names {
        Some(names) if !names.is_empty() => {
            let mut resolved = Vec::with_capacity(names.len());
            for name in names {
                let path = dir.join(name);
                if !path.is_file() {
                    return Err(eyre!("File not found: {}", path.display()));
                }
                if !is_supported(&path) {
                    return Err(eyre!("Unsupported file extension: {}", name));
                }
                resolved.push(path);
            }
            Ok(resolved)
        }
        _ => {
            let files = list_supported_files(dir)?;
            if files.is_empty() {
                return Err(eyre!(
                    "No .csv/.xls/.xlsx files found in {}",
                    dir.display()
                ));
            }
            Ok(files)
        }
    }
}

/// Loads one file into a DataFrame, dispatching on the extension.
/// `sheet` selects an Excel worksheet by 0-based index or name; CSV ignores it.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(eyre!("File not found: {}", path.display()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => read_csv(path),
        Some("xls") | Some("xlsx") => read_excel(path, sheet),
        _ => Err(eyre!("Unsupported file extension: {}", path.display())),
    }
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .map_err(|e| eyre!("CSV: {}", e))?
        .finish()
        .map_err(|e| eyre!("CSV: {}", e))?;
    Ok(df)
}

/// Reads an Excel worksheet (first row as header) into a DataFrame.
fn read_excel(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path).map_err(|e| eyre!("Excel: {}", e))?;
    if workbook.sheet_names().is_empty() {
        return Err(eyre!("Excel: file has no worksheets"));
    }
    let range = match sheet {
        Some(selector) => {
            if let Ok(idx) = selector.parse::<usize>() {
                workbook
                    .worksheet_range_at(idx)
                    .ok_or_else(|| eyre!("Excel: no sheet at index {}", idx))?
                    .map_err(|e| eyre!("Excel: {}", e))?
            } else {
                workbook
                    .worksheet_range(selector)
                    .map_err(|e| eyre!("Excel: {}", e))?
            }
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| eyre!("Excel: no first sheet"))?
            .map_err(|e| eyre!("Excel: {}", e))?,
    };

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    if rows.is_empty() {
        return Ok(DataFrame::new_with_height(0, vec![])?);
    }

    let headers: Vec<String> = rows[0]
        .iter()
        .map(|c| calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string()))
        .collect();
    let mut columns = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = rows[1..].iter().map(|row| row.get(col_idx)).collect();
        let name = if header.is_empty() {
            format!("column_{}", col_idx + 1)
        } else {
            header.clone()
        };
        let series = excel_column_to_series(name.as_str(), &cells, excel_infer_column_type(&cells));
        columns.push(series.into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Infers a column type from the cells; prefers Int64 for whole-number float
/// columns. Anything containing strings or datetimes loads as Utf8.
fn excel_infer_column_type(cells: &[Option<&Data>]) -> ExcelColType {
    use calamine::DataType as CalamineTrait;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    for cell in cells.iter().flatten() {
        if CalamineTrait::is_string(*cell)
            || CalamineTrait::is_datetime(*cell)
            || CalamineTrait::is_datetime_iso(*cell)
        {
            return ExcelColType::Utf8;
        }
        if CalamineTrait::is_float(*cell) {
            has_float = true;
        }
        if CalamineTrait::is_int(*cell) {
            has_int = true;
        }
        if CalamineTrait::is_bool(*cell) {
            has_bool = true;
        }
    }
    if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            cell.as_f64()
                .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if all_whole {
            ExcelColType::Int64
        } else {
            ExcelColType::Float64
        }
    } else if has_int {
        ExcelColType::Int64
    } else if has_bool {
        ExcelColType::Boolean
    } else {
        ExcelColType::Utf8
    }
}

fn excel_column_to_series(name: &str, cells: &[Option<&Data>], col_type: ExcelColType) -> Series {
    use calamine::DataType as CalamineTrait;
    match col_type {
        ExcelColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_i64()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_f64()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| {
                    c.and_then(|cell| {
                        if CalamineTrait::is_empty(cell) {
                            None
                        } else {
                            CalamineTrait::as_string(cell).or_else(|| Some(cell.to_string()))
                        }
                    })
                })
                .collect();
            Series::new(name.into(), v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions() {
        assert!(is_supported(Path::new("a.csv")));
        assert!(is_supported(Path::new("a.XLSX")));
        assert!(is_supported(Path::new("dir/b.xls")));
        assert!(!is_supported(Path::new("a.parquet")));
        assert!(!is_supported(Path::new("a.csv.gz")));
        assert!(!is_supported(Path::new("noext")));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = list_supported_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("Data directory not found"));
    }
}
