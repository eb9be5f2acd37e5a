//! Header-aware row operations on top of raw value ranges.
//!
//! Row indices are 0-based positions among the data rows of a sheet, so data
//! row `i` lives on A1 row `i + 2` and grid row `i + 1` (the header takes row 1).

use std::sync::Arc;

use tracing::debug;

use models::{Category, Row, Schema};

use crate::errors::ServiceError;
use crate::store::{SheetRange, SheetRequest, SheetsApi};

/// Header plus data rows of one sheet, each row zipped with the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub header: Vec<String>,
    /// Positional; blank rows are kept as empty maps so indices stay stable.
    pub rows: Vec<Row>,
}

impl SheetTable {
    fn from_values(mut values: Vec<Vec<String>>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let header: Vec<String> = values.remove(0).into_iter().map(|h| h.trim().to_string()).collect();
        let rows = values
            .into_iter()
            .map(|cells| {
                // cells past the header have no field name and are dropped by the zip
                header
                    .iter()
                    .zip(cells)
                    .filter(|(h, _)| !h.is_empty())
                    .map(|(h, c)| (h.clone(), c))
                    .collect::<Row>()
            })
            .collect();
        Self { header, rows }
    }

    fn ensure_index(&self, sheet: &str, index: usize) -> Result<(), ServiceError> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "row {index} of `{sheet}` not found ({} data rows)",
                self.rows.len()
            )))
        }
    }
}

#[derive(Clone)]
pub struct SheetClient {
    api: Arc<dyn SheetsApi>,
}

impl SheetClient {
    pub fn new(api: Arc<dyn SheetsApi>) -> Self {
        Self { api }
    }

    /// Turns a freshly created spreadsheet into an itinerary template: one
    /// sheet per category with its header row, and the default sheet removed.
    ///
    /// Precondition: the spreadsheet still has only its default sheet (id 0).
    /// Running this twice on the same file is not guarded; the sheet service
    /// rejects the duplicate sheet names.
    pub async fn bootstrap(&self, spreadsheet_id: &str) -> Result<(), ServiceError> {
        let mut requests: Vec<SheetRequest> = Category::ALL
            .iter()
            .enumerate()
            .map(|(index, c)| SheetRequest::AddSheet { title: c.sheet_name().to_string(), index })
            .collect();
        requests.push(SheetRequest::DeleteSheet { sheet_id: 0 });
        self.api.batch_update(spreadsheet_id, requests).await?;

        for category in Category::ALL {
            let schema = category.schema();
            self.api
                .append_values(spreadsheet_id, &SheetRange::whole(category.sheet_name()), vec![schema.header()])
                .await?;
        }
        debug!(%spreadsheet_id, "bootstrapped spreadsheet");
        Ok(())
    }

    pub async fn read_range(&self, spreadsheet_id: &str, sheet: &str) -> Result<SheetTable, ServiceError> {
        let values = self.api.get_values(spreadsheet_id, &SheetRange::whole(sheet)).await?;
        Ok(SheetTable::from_values(values))
    }

    pub async fn read_header(&self, spreadsheet_id: &str, sheet: &str) -> Result<Vec<String>, ServiceError> {
        let values = self.api.get_values(spreadsheet_id, &SheetRange::row(sheet, 1)).await?;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    async fn checked_header(&self, spreadsheet_id: &str, schema: Schema) -> Result<(), ServiceError> {
        let live = self.read_header(spreadsheet_id, schema.category().sheet_name()).await?;
        schema.check_header(&live)?;
        Ok(())
    }

    /// Appends after the last row; returns the number of cells written.
    pub async fn append_rows(&self, spreadsheet_id: &str, schema: Schema, rows: &[Row]) -> Result<u64, ServiceError> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.checked_header(spreadsheet_id, schema).await?;
        let sheet = schema.category().sheet_name();
        let values = rows.iter().map(|r| schema.project(r)).collect();
        let written = self
            .api
            .append_values(spreadsheet_id, &SheetRange::whole(sheet), values)
            .await?;
        debug!(%spreadsheet_id, %sheet, rows = rows.len(), written, "appended rows");
        Ok(written)
    }

    pub async fn update_row(&self, spreadsheet_id: &str, schema: Schema, index: usize, row: &Row) -> Result<u64, ServiceError> {
        let sheet = schema.category().sheet_name();
        let table = self.read_range(spreadsheet_id, sheet).await?;
        schema.check_header(&table.header)?;
        table.ensure_index(sheet, index)?;
        let written = self
            .api
            .update_values(spreadsheet_id, &SheetRange::row(sheet, a1_row(index)?), vec![schema.project(row)])
            .await?;
        debug!(%spreadsheet_id, %sheet, index, written, "updated row");
        Ok(written)
    }

    /// Structural delete: every later row moves up by one.
    pub async fn delete_row(&self, spreadsheet_id: &str, schema: Schema, index: usize) -> Result<(), ServiceError> {
        let sheet = schema.category().sheet_name();
        let table = self.read_range(spreadsheet_id, sheet).await?;
        table.ensure_index(sheet, index)?;
        let sheet_id = self.sheet_id(spreadsheet_id, sheet).await?;
        self.api
            .batch_update(
                spreadsheet_id,
                vec![SheetRequest::DeleteRows { sheet_id, start: index + 1, end: index + 2 }],
            )
            .await?;
        debug!(%spreadsheet_id, %sheet, index, "deleted row");
        Ok(())
    }

    /// Clears everything below the header.
    pub async fn clear_sheet(&self, spreadsheet_id: &str, sheet: &str) -> Result<(), ServiceError> {
        self.api.clear_values(spreadsheet_id, &SheetRange::rows_from(sheet, 2)).await
    }

    /// Clear then append. The header is checked first so a mismatch never
    /// leaves the sheet emptied. Not atomic against concurrent writers.
    pub async fn replace_rows(&self, spreadsheet_id: &str, schema: Schema, rows: &[Row]) -> Result<u64, ServiceError> {
        self.checked_header(spreadsheet_id, schema).await?;
        let sheet = schema.category().sheet_name();
        self.clear_sheet(spreadsheet_id, sheet).await?;
        if rows.is_empty() {
            return Ok(0);
        }
        let values = rows.iter().map(|r| schema.project(r)).collect();
        self.api.append_values(spreadsheet_id, &SheetRange::whole(sheet), values).await
    }

    pub async fn sheet_id(&self, spreadsheet_id: &str, title: &str) -> Result<i64, ServiceError> {
        self.api
            .list_sheets(spreadsheet_id)
            .await?
            .into_iter()
            .find(|s| s.title == title)
            .map(|s| s.sheet_id)
            .ok_or_else(|| ServiceError::not_found(&format!("sheet `{title}`")))
    }
}

fn a1_row(index: usize) -> Result<u32, ServiceError> {
    u32::try_from(index + 2).map_err(|_| ServiceError::Validation(format!("row index {index} out of range")))
}
