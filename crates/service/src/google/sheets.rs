use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::ServiceError;
use crate::google::http::{endpoint, parse_base, GoogleHttp};
use crate::store::{SheetProperties, SheetRange, SheetRequest, SheetsApi};

const API: &str = "sheets";
// Written verbatim: cell text is never evaluated as a formula and reads give back what was stored.
const VALUE_INPUT_OPTION: &str = "RAW";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    updated_cells: u64,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: Option<UpdateResponse>,
}

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: RawProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
}

/// Sheets v4 client.
pub struct GoogleSheets {
    http: GoogleHttp,
    base: Url,
}

impl GoogleSheets {
    pub fn new(http: GoogleHttp, base_url: &str) -> Result<Self, ServiceError> {
        Ok(Self { http, base: parse_base(base_url)? })
    }

    fn url(&self, spreadsheet_id: &str, tail: &[&str]) -> Result<Url, ServiceError> {
        let mut segments = vec!["spreadsheets", spreadsheet_id];
        segments.extend_from_slice(tail);
        endpoint(&self.base, &segments)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, ServiceError> {
        self.url(spreadsheet_id, &["values", range])
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// JSON form of a batch-update request.
pub fn request_json(request: &SheetRequest) -> Value {
    match request {
        SheetRequest::AddSheet { title, index } => {
            json!({ "addSheet": { "properties": { "title": title, "index": index } } })
        }
        SheetRequest::DeleteSheet { sheet_id } => json!({ "deleteSheet": { "sheetId": sheet_id } }),
        SheetRequest::DeleteRows { sheet_id, start, end } => json!({
            "deleteDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": start,
                    "endIndex": end,
                }
            }
        }),
    }
}

#[async_trait]
impl SheetsApi for GoogleSheets {
    async fn get_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<Vec<Vec<String>>, ServiceError> {
        let req = self
            .http
            .client()
            .get(self.values_url(spreadsheet_id, &range.to_a1())?)
            .query(&[("majorDimension", "ROWS")]);
        let vr: ValueRange = self.http.send_json(API, req).await?;
        Ok(vr
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_values(&self, spreadsheet_id: &str, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<u64, ServiceError> {
        let target = format!("{}:append", range.to_a1());
        let req = self
            .http
            .client()
            .post(self.values_url(spreadsheet_id, &target)?)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "majorDimension": "ROWS", "values": rows }));
        let resp: AppendResponse = self.http.send_json(API, req).await?;
        Ok(resp.updates.map(|u| u.updated_cells).unwrap_or(0))
    }

    async fn update_values(&self, spreadsheet_id: &str, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<u64, ServiceError> {
        let a1 = range.to_a1();
        let req = self
            .http
            .client()
            .put(self.values_url(spreadsheet_id, &a1)?)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&json!({ "range": a1, "majorDimension": "ROWS", "values": rows }));
        let resp: UpdateResponse = self.http.send_json(API, req).await?;
        Ok(resp.updated_cells)
    }

    async fn clear_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<(), ServiceError> {
        let target = format!("{}:clear", range.to_a1());
        let req = self
            .http
            .client()
            .post(self.values_url(spreadsheet_id, &target)?)
            .json(&json!({}));
        self.http.send_empty(API, req).await
    }

    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, ServiceError> {
        let req = self
            .http
            .client()
            .get(self.url(spreadsheet_id, &[])?)
            .query(&[("fields", "sheets.properties(sheetId,title)")]);
        let doc: Spreadsheet = self.http.send_json(API, req).await?;
        Ok(doc
            .sheets
            .into_iter()
            .map(|s| SheetProperties {
                sheet_id: s.properties.sheet_id,
                title: s.properties.title,
            })
            .collect())
    }

    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<SheetRequest>) -> Result<(), ServiceError> {
        let target = format!("{spreadsheet_id}:batchUpdate");
        let body = json!({ "requests": requests.iter().map(request_json).collect::<Vec<_>>() });
        let req = self
            .http
            .client()
            .post(endpoint(&self.base, &["spreadsheets", target.as_str()])?)
            .json(&body);
        self.http.send_empty(API, req).await
    }
}
