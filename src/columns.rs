//! Resolution of caller-supplied column tokens against a loaded table.
//!
//! A token is either a real header name or a spreadsheet letter code
//! ("A", "AC") addressing a column by position.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::DataFrame;

/// Converts spreadsheet column letters to a zero-based index:
/// A -> 0, B -> 1, Z -> 25, AA -> 26, AC -> 28.
pub fn letter_code_to_index(code: &str) -> Result<usize> {
    let code = code.trim().to_ascii_uppercase();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(eyre!("Not a spreadsheet column code: {}", code));
    }
    let mut index: usize = 0;
    for ch in code.chars() {
        // No sheet has anywhere near usize::MAX columns, so an overflowing
        // code is just out of range for any real table.
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(ch as usize - 'A' as usize + 1))
            .ok_or_else(|| eyre!("Spreadsheet column {} out of range", code))?;
    }
    Ok(index - 1)
}

/// Maps a column token to a real header name.
///
/// An exact header match wins. Otherwise a purely alphabetic token is read
/// as a letter code and mapped to the column at that position; anything else
/// is a configuration error.
pub fn resolve_column(df: &DataFrame, token: &str) -> Result<String> {
    let names = df.get_column_names();
    if names.iter().any(|n| n.as_str() == token) {
        return Ok(token.to_string());
    }

    let trimmed = token.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        let index = letter_code_to_index(trimmed)?;
        if index >= names.len() {
            return Err(eyre!(
                "Spreadsheet column {} out of range ({} columns)",
                token,
                names.len()
            ));
        }
        return Ok(names[index].to_string());
    }

    Err(eyre!("Column not found: {}", token))
}
