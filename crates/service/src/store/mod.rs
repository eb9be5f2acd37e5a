//! Seams to the external file store and spreadsheet service.
//!
//! Both traits are thin: one method per remote call. Anything that chains
//! calls (header checks, template copies, folder discovery) lives above them.

use async_trait::async_trait;
use common::{FOLDER_MIME_TYPE, SPREADSHEET_MIME_TYPE};
use models::FileMetadata;

use crate::errors::ServiceError;

/// Permission granted when sharing. Owners always get edit access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRole {
    Writer,
}

impl ShareRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareRole::Writer => "writer",
        }
    }
}

/// Folder/file operations of the hosted file store.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn create_file(&self, name: &str, mime_type: &str, parent: Option<&str>) -> Result<FileMetadata, ServiceError>;
    async fn copy_file(&self, file_id: &str, name: &str, parent: &str) -> Result<FileMetadata, ServiceError>;
    /// Re-parent: every current parent is replaced by `new_parent`.
    async fn move_file(&self, file_id: &str, new_parent: &str) -> Result<FileMetadata, ServiceError>;
    /// Files in store order, optionally filtered by mime type and parent folder.
    async fn list_files(&self, mime_type: Option<&str>, parent: Option<&str>) -> Result<Vec<FileMetadata>, ServiceError>;
    async fn get_file(&self, file_id: &str) -> Result<FileMetadata, ServiceError>;
    async fn get_parents(&self, file_id: &str) -> Result<Vec<String>, ServiceError>;
    /// Permanent; skips the trash.
    async fn delete_file(&self, file_id: &str) -> Result<(), ServiceError>;
    async fn share_file(&self, file_id: &str, email: &str, role: ShareRole) -> Result<(), ServiceError>;

    async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<FileMetadata, ServiceError> {
        self.create_file(name, FOLDER_MIME_TYPE, parent).await
    }

    async fn create_spreadsheet(&self, name: &str, parent: Option<&str>) -> Result<FileMetadata, ServiceError> {
        self.create_file(name, SPREADSHEET_MIME_TYPE, parent).await
    }

    async fn list_folders(&self, parent: Option<&str>) -> Result<Vec<FileMetadata>, ServiceError> {
        self.list_files(Some(FOLDER_MIME_TYPE), parent).await
    }

    async fn list_spreadsheets(&self, parent: Option<&str>) -> Result<Vec<FileMetadata>, ServiceError> {
        self.list_files(Some(SPREADSHEET_MIME_TYPE), parent).await
    }
}

/// Rows of one sheet, 1-based like A1 notation. Columns always span the whole row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: String,
    pub first_row: Option<u32>,
    pub last_row: Option<u32>,
}

impl SheetRange {
    pub fn whole(sheet: &str) -> Self {
        Self { sheet: sheet.to_string(), first_row: None, last_row: None }
    }

    pub fn rows_from(sheet: &str, first_row: u32) -> Self {
        Self { sheet: sheet.to_string(), first_row: Some(first_row), last_row: None }
    }

    pub fn row(sheet: &str, row: u32) -> Self {
        Self { sheet: sheet.to_string(), first_row: Some(row), last_row: Some(row) }
    }

    pub fn to_a1(&self) -> String {
        let sheet = quote_sheet_name(&self.sheet);
        match (self.first_row, self.last_row) {
            (None, _) => sheet,
            (Some(first), None) => format!("{sheet}!A{first}:Z"),
            (Some(first), Some(last)) => format!("{sheet}!A{first}:Z{last}"),
        }
    }
}

fn quote_sheet_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// Structural edits sent through a spreadsheet batch update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRequest {
    AddSheet { title: String, index: usize },
    DeleteSheet { sheet_id: i64 },
    /// 0-based grid rows `[start, end)`; later rows shift up.
    DeleteRows { sheet_id: i64, start: usize, end: usize },
}

/// Raw value-range and structure operations of the spreadsheet service.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Cell text by row; trailing empty cells and rows are not returned.
    async fn get_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<Vec<Vec<String>>, ServiceError>;
    /// Appends after the last non-empty row of the range; returns cells written.
    async fn append_values(&self, spreadsheet_id: &str, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<u64, ServiceError>;
    /// Overwrites starting at the range's first row; returns cells written.
    async fn update_values(&self, spreadsheet_id: &str, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<u64, ServiceError>;
    async fn clear_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<(), ServiceError>;
    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, ServiceError>;
    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<SheetRequest>) -> Result<(), ServiceError>;
}
