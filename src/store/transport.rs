use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Spreadsheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spreadsheet API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Spreadsheet returned a non-JSON response: {0}")]
    BadResponse(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),
}

/// Raw operations against one remote workbook. Everything above this trait
/// (caching, pacing, header indexing, seeding) lives in `RowStore`; everything
/// below it is a dumb wire call.
#[rocket::async_trait]
pub trait SheetsTransport: Send + Sync {
    /// Titles of all sheets currently in the workbook.
    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError>;

    /// Full grid of a sheet, header row included. Missing trailing cells are
    /// simply absent from the inner vectors.
    async fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError>;

    async fn append(&self, sheet: &str, row: Vec<String>) -> Result<(), StoreError>;

    /// Overwrite a block of cells starting at an A1 address like `"A1"`.
    async fn update_range(
        &self,
        sheet: &str,
        start_cell: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), StoreError>;

    async fn add_sheet(&self, sheet: &str) -> Result<(), StoreError>;

    /// Remove one row by 0-based index over the full grid (0 = header).
    async fn delete_row(&self, sheet: &str, row_index: usize) -> Result<(), StoreError>;
}

/// A1 column letters for a 0-based column index (0 -> A, 26 -> AA).
pub fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}

/// A1 address for a 0-based (row, col) cell.
pub fn a1(row: usize, col: usize) -> String {
    format!("{}{}", column_letters(col), row + 1)
}

/// Parse an A1 address back into 0-based (row, col).
pub fn parse_a1(cell: &str) -> Option<(usize, usize)> {
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        col = col * 26 + (ch as usize - 'A' as usize + 1);
    }
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

/// Google-Sheets-style REST transport. Authenticates with a bearer token; the
/// token itself is minted outside this service and supplied via config.
pub struct RestTransport {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    api_token: String,
}

impl RestTransport {
    pub fn new(base_url: &str, spreadsheet_id: &str, api_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            api_token: api_token.to_string(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.spreadsheet_id, suffix)
    }

    /// Unwrap a response into JSON, classifying the failure modes the
    /// spreadsheet service actually produces: HTML login redirects, non-JSON
    /// bodies, and structured API errors.
    async fn into_json(resp: reqwest::Response) -> Result<Value, StoreError> {
        let status = resp.status();
        let text = resp.text().await?;
        let trimmed = text.trim_start();
        if trimmed.starts_with('<') {
            return Err(StoreError::BadResponse(
                "received HTML instead of JSON; check credentials and sharing settings".to_string(),
            ));
        }
        let value: Value = serde_json::from_str(&text).map_err(|_| {
            StoreError::BadResponse(text.chars().take(120).collect::<String>())
        })?;
        if !status.is_success() {
            let message = value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("request rejected")
                .to_string();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(value)
    }

    async fn batch_update(&self, request: Value) -> Result<Value, StoreError> {
        let resp = self
            .http
            .post(self.url(":batchUpdate"))
            .bearer_auth(&self.api_token)
            .json(&json!({ "requests": [request] }))
            .send()
            .await?;
        Self::into_json(resp).await
    }

    async fn sheet_id(&self, sheet: &str) -> Result<i64, StoreError> {
        let resp = self
            .http
            .get(self.url("?fields=sheets.properties"))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let value = Self::into_json(resp).await?;
        value
            .pointer("/sheets")
            .and_then(Value::as_array)
            .and_then(|sheets| {
                sheets.iter().find_map(|s| {
                    let props = s.get("properties")?;
                    if props.get("title")?.as_str()? == sheet {
                        props.get("sheetId")?.as_i64()
                    } else {
                        None
                    }
                })
            })
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }
}

#[rocket::async_trait]
impl SheetsTransport for RestTransport {
    #[instrument(skip(self))]
    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let resp = self
            .http
            .get(self.url("?fields=sheets.properties.title"))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let value = Self::into_json(resp).await?;
        Ok(value
            .pointer("/sheets")
            .and_then(Value::as_array)
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|s| s.pointer("/properties/title")?.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let resp = self
            .http
            .get(self.url(&format!("/values/{}!A:ZZ", sheet)))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        let value = Self::into_json(resp).await?;
        let rows = value
            .get("values")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| {
                                cells
                                    .iter()
                                    .map(|c| match c {
                                        Value::String(s) => s.clone(),
                                        other => other.to_string(),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    #[instrument(skip(self, row))]
    async fn append(&self, sheet: &str, row: Vec<String>) -> Result<(), StoreError> {
        debug!(cells = row.len(), "Appending row");
        let resp = self
            .http
            .post(self.url(&format!(
                "/values/{}!A:ZZ:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
                sheet
            )))
            .bearer_auth(&self.api_token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        Self::into_json(resp).await?;
        Ok(())
    }

    #[instrument(skip(self, values))]
    async fn update_range(
        &self,
        sheet: &str,
        start_cell: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), StoreError> {
        let resp = self
            .http
            .put(self.url(&format!(
                "/values/{}!{}?valueInputOption=USER_ENTERED",
                sheet, start_cell
            )))
            .bearer_auth(&self.api_token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        Self::into_json(resp).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_sheet(&self, sheet: &str) -> Result<(), StoreError> {
        self.batch_update(json!({
            "addSheet": { "properties": { "title": sheet } }
        }))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_row(&self, sheet: &str, row_index: usize) -> Result<(), StoreError> {
        let sheet_id = self.sheet_id(sheet).await?;
        self.batch_update(json!({
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row_index,
                    "endIndex": row_index + 1,
                }
            }
        }))
        .await?;
        Ok(())
    }
}

/// In-process transport: an ephemeral workbook in a mutex-guarded map.
/// Selected with `SHEETS_BACKEND=memory` for credential-free local runs, and
/// the substrate for the whole test suite.
#[derive(Default)]
pub struct MemoryTransport {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct snapshot of a sheet, bypassing the store. Test hook.
    pub fn raw_sheet(&self, sheet: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .expect("sheet map poisoned")
            .get(sheet)
            .cloned()
            .unwrap_or_default()
    }
}

#[rocket::async_trait]
impl SheetsTransport for MemoryTransport {
    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .sheets
            .lock()
            .expect("sheet map poisoned")
            .keys()
            .cloned()
            .collect())
    }

    async fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let sheets = self.sheets.lock().expect("sheet map poisoned");
        sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    async fn append(&self, sheet: &str, row: Vec<String>) -> Result<(), StoreError> {
        let mut sheets = self.sheets.lock().expect("sheet map poisoned");
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        grid.push(row);
        Ok(())
    }

    async fn update_range(
        &self,
        sheet: &str,
        start_cell: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), StoreError> {
        let (start_row, start_col) = parse_a1(start_cell)
            .ok_or_else(|| StoreError::BadResponse(format!("bad cell address '{}'", start_cell)))?;
        let mut sheets = self.sheets.lock().expect("sheet map poisoned");
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        for (r, row) in values.into_iter().enumerate() {
            let target_row = start_row + r;
            while grid.len() <= target_row {
                grid.push(Vec::new());
            }
            for (c, cell) in row.into_iter().enumerate() {
                let target_col = start_col + c;
                let grid_row = &mut grid[target_row];
                while grid_row.len() <= target_col {
                    grid_row.push(String::new());
                }
                grid_row[target_col] = cell;
            }
        }
        Ok(())
    }

    async fn add_sheet(&self, sheet: &str) -> Result<(), StoreError> {
        self.sheets
            .lock()
            .expect("sheet map poisoned")
            .entry(sheet.to_string())
            .or_default();
        Ok(())
    }

    async fn delete_row(&self, sheet: &str, row_index: usize) -> Result<(), StoreError> {
        let mut sheets = self.sheets.lock().expect("sheet map poisoned");
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        if row_index >= grid.len() {
            return Err(StoreError::BadResponse(format!(
                "row {} out of range for sheet '{}'",
                row_index, sheet
            )));
        }
        grid.remove(row_index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_round_trips() {
        assert_eq!(a1(0, 0), "A1");
        assert_eq!(a1(4, 1), "B5");
        assert_eq!(a1(0, 26), "AA1");
        assert_eq!(parse_a1("A1"), Some((0, 0)));
        assert_eq!(parse_a1("B5"), Some((4, 1)));
        assert_eq!(parse_a1("AA10"), Some((9, 26)));
        assert_eq!(parse_a1("5"), None);
        assert_eq!(parse_a1("A0"), None);
    }

    #[tokio::test]
    async fn memory_transport_grows_rows_on_demand() {
        let t = MemoryTransport::new();
        t.add_sheet("Users").await.unwrap();
        t.update_range("Users", "A1", vec![vec!["id".into(), "username".into()]])
            .await
            .unwrap();
        t.append("Users", vec!["ST-1".into(), "dana".into()])
            .await
            .unwrap();
        t.update_range("Users", "C2", vec![vec!["active".into()]])
            .await
            .unwrap();

        let grid = t.get_values("Users").await.unwrap();
        assert_eq!(grid[0], vec!["id", "username"]);
        assert_eq!(grid[1], vec!["ST-1", "dana", "active"]);
    }

    #[tokio::test]
    async fn memory_transport_reports_missing_sheets() {
        let t = MemoryTransport::new();
        assert!(matches!(
            t.get_values("Nope").await,
            Err(StoreError::SheetNotFound(_))
        ));
        assert!(matches!(
            t.append("Nope", vec![]).await,
            Err(StoreError::SheetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn memory_transport_delete_shifts_rows() {
        let t = MemoryTransport::new();
        t.add_sheet("S").await.unwrap();
        for row in ["h", "a", "b", "c"] {
            t.append("S", vec![row.into()]).await.unwrap();
        }
        t.delete_row("S", 2).await.unwrap();
        let grid = t.get_values("S").await.unwrap();
        assert_eq!(grid, vec![vec!["h"], vec!["a"], vec!["c"]]);
    }
}
