use std::collections::HashMap;

use crate::error::AppError;

/// Point-in-time snapshot of one sheet: the header row plus data rows, with a
/// name→column index built once at read time.
///
/// Row indices here are 0-based over the full grid including the header, the
/// same convention the store's `update_cell`/`delete_row` use, so an index
/// found by scanning a `Table` can be passed straight back to the store.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: HashMap<String, usize>,
    grid: Vec<Vec<String>>,
}

impl Table {
    pub fn from_grid(name: &str, grid: Vec<Vec<String>>) -> Self {
        let columns = grid
            .first()
            .map(|headers| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), i))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            columns,
            grid,
        }
    }

    /// True when the sheet holds no data rows (header-only or fully empty).
    pub fn is_empty(&self) -> bool {
        self.grid.len() < 2
    }

    /// Column index for a header name. Missing columns are a schema drift
    /// error the caller cannot recover from.
    pub fn col(&self, header: &str) -> Result<usize, AppError> {
        self.columns.get(header).copied().ok_or_else(|| {
            AppError::Internal(format!(
                "Sheet '{}' is missing expected column '{}'",
                self.name, header
            ))
        })
    }

    /// Column index for a header that may legitimately be absent (older
    /// workbooks created before the column was introduced).
    pub fn col_opt(&self, header: &str) -> Option<usize> {
        self.columns.get(header).copied()
    }

    /// Cell value at (row, col); absent cells read as "". Sheets drop
    /// trailing empty cells, so short rows are normal, not an error.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.grid
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn get(&self, row: usize, header: &str) -> Result<&str, AppError> {
        Ok(self.cell(row, self.col(header)?))
    }

    /// Iterator over data-row indices (skipping the header at 0). Double
    /// ended, so deletion scans can walk bottom-up.
    pub fn data_rows(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        1..self.grid.len()
    }

    /// Index of the first data row whose `header` column equals `value`.
    pub fn find(&self, header: &str, value: &str) -> Result<Option<usize>, AppError> {
        let col = self.col(header)?;
        Ok(self.data_rows().find(|&i| self.cell(i, col) == value))
    }
}

/// Completion flags are written as booleans by the API but come back from a
/// spreadsheet as text; hand-edited cells may carry either form.
pub fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// Assessment values use the `yes`/`no` convention; tolerate booleans too so
/// readers and writers stay symmetric.
pub fn parse_yes_no(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("yes") || raw.eq_ignore_ascii_case("true")
}
