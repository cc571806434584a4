/// Delimited-text loading for numeric datasets.
///
/// Supported format:
/// - UTF-8, one sample per line, any single-character delimiter
/// - Optional header row (skipped when `has_header` is set)
/// - Double-quoted fields may contain the delimiter
/// - Blank lines are ignored
///
/// The first `n_features` columns of each row become the inputs, every
/// remaining column is a target.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reads `path` into `(x, y)`.
///
/// # Errors
/// `Error::Io` if the file cannot be read, `Error::Parse` (1-based line
/// number) for a non-numeric cell or a row whose width differs from the first.
pub fn read_csv<P: AsRef<Path>>(
    path: P,
    n_features: usize,
    delimiter: char,
    has_header: bool,
) -> Result<(Matrix, Matrix)> {
    let text = fs::read_to_string(path)?;
    parse_csv(&text, n_features, delimiter, has_header)
}

/// Same as [`read_csv`] on text already in memory.
pub fn parse_csv(
    text: &str,
    n_features: usize,
    delimiter: char,
    has_header: bool,
) -> Result<(Matrix, Matrix)> {
    let skip = usize::from(has_header);

    let mut x_data: Vec<f64> = Vec::new();
    let mut y_data: Vec<f64> = Vec::new();
    let mut width: Option<usize> = None;
    let mut n_rows = 0;

    for (idx, line) in text.lines().enumerate().skip(skip) {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cells = parse_row(line, delimiter);
        match width {
            None => {
                if cells.len() < n_features {
                    return Err(Error::Parse {
                        line: line_no,
                        message: format!(
                            "expected at least {} feature columns, got {}",
                            n_features,
                            cells.len()
                        ),
                    });
                }
                width = Some(cells.len());
            }
            Some(w) if w != cells.len() => {
                return Err(Error::Parse {
                    line: line_no,
                    message: format!("row has {} columns, first row has {}", cells.len(), w),
                });
            }
            Some(_) => {}
        }

        for (j, cell) in cells.iter().enumerate() {
            let value = parse_cell(cell, line_no)?;
            if j < n_features {
                x_data.push(value);
            } else {
                y_data.push(value);
            }
        }
        n_rows += 1;
    }

    let n_targets = width.map_or(0, |w| w - n_features);
    let x = Matrix::from_vec(n_rows, n_features, x_data)?;
    let y = Matrix::from_vec(n_rows, n_targets, y_data)?;
    Ok((x, y))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Splits a row on `delimiter`, honouring double quotes.
fn parse_row(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                // Escaped quote inside quoted field.
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_cell(cell: &str, line_no: usize) -> Result<f64> {
    cell.trim().parse::<f64>().map_err(|_| Error::Parse {
        line: line_no,
        message: format!("'{}' is not a valid number", cell.trim()),
    })
}
