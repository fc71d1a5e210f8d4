use color_eyre::Result;
use hitrate::analysis::{run_analysis, AnalysisOptions, FilterSpec};
use hitrate::source::{list_supported_files, load_table, resolve_files};
use std::fs;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_discovery_sorted_case_insensitively() -> Result<()> {
    let dir = TempDir::new()?;
    write_csv(dir.path(), "b.csv", "a\n1\n");
    write_csv(dir.path(), "A.csv", "a\n1\n");
    File::create(dir.path().join("notes.txt"))?;
    File::create(dir.path().join("C.xlsx"))?;

    let files = list_supported_files(dir.path())?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["A.csv", "b.csv", "C.xlsx"]);
    Ok(())
}

#[test]
fn test_resolve_files_default_requires_supported_files() -> Result<()> {
    let dir = TempDir::new()?;
    File::create(dir.path().join("notes.txt"))?;
    let err = resolve_files(dir.path(), None).unwrap_err();
    assert!(err.to_string().contains("No .csv/.xls/.xlsx files"));
    Ok(())
}

#[test]
fn test_resolve_files_explicit_names() -> Result<()> {
    let dir = TempDir::new()?;
    write_csv(dir.path(), "in.csv", "a\n1\n");

    let files = resolve_files(dir.path(), Some(&["in.csv".to_string()]))?;
    assert_eq!(files, vec![dir.path().join("in.csv")]);

    let err = resolve_files(dir.path(), Some(&["nope.csv".to_string()])).unwrap_err();
    assert!(err.to_string().contains("File not found"));

    File::create(dir.path().join("x.txt"))?;
    let err = resolve_files(dir.path(), Some(&["x.txt".to_string()])).unwrap_err();
    assert!(err.to_string().contains("Unsupported file extension"));
    Ok(())
}

#[test]
fn test_load_table_missing_file() -> Result<()> {
    let err = load_table(Path::new("/no/such/file.csv"), None).unwrap_err();
    assert!(err.to_string().contains("File not found"));
    Ok(())
}

#[test]
fn test_load_table_unsupported_extension() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("data.parquet");
    File::create(&path)?;
    let err = load_table(&path, None).unwrap_err();
    assert!(err.to_string().contains("Unsupported file extension"));
    Ok(())
}

#[test]
fn test_csv_columns_in_source_order() -> Result<()> {
    let dir = TempDir::new()?;
    write_csv(dir.path(), "in.csv", "z,a,m\n1,2,3\n");
    let df = load_table(&dir.path().join("in.csv"), None)?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["z", "a", "m"]);
    assert_eq!(df.height(), 1);
    Ok(())
}

#[test]
fn test_csv_end_to_end_analysis() -> Result<()> {
    let dir = TempDir::new()?;
    write_csv(
        dir.path(),
        "in.csv",
        "desc,kind\n,alpha\nok,alpha\n,beta\nok,beta\n",
    );
    let df = load_table(&dir.path().join("in.csv"), None)?;

    let spec = FilterSpec {
        column: "desc".to_string(),
        value: "leer".to_string(),
    };
    let result = run_analysis(
        &df,
        &spec,
        &["kind".to_string()],
        AnalysisOptions::default(),
    )?;
    // Empty CSV cells load as null and count as empty for the filter.
    assert_eq!(result.file_rows, 4);
    assert_eq!(result.filter_matched_total, 2);
    assert_eq!(result.filter_matched_pct, 50.0);
    let stats = &result.per_column[0].stats;
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|s| s.total == 2 && s.matched == 1));
    Ok(())
}
