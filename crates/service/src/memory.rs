//! In-process file store and spreadsheet service.
//!
//! Mirrors the parts of Drive/Sheets behaviour the service relies on:
//! new spreadsheets start with one sheet (id 0), copies keep their sheets,
//! reads drop trailing empty cells and rows, and errors carry the status
//! codes the real APIs answer with.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use common::SPREADSHEET_MIME_TYPE;
use models::FileMetadata;

use crate::errors::ServiceError;
use crate::store::{FileStore, SheetProperties, SheetRange, SheetRequest, SheetsApi, ShareRole};

#[derive(Debug, Clone)]
struct MemSheet {
    sheet_id: i64,
    title: String,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
struct MemFile {
    meta: FileMetadata,
    sheets: Vec<MemSheet>,
    permissions: Vec<(String, ShareRole)>,
}

#[derive(Default)]
struct MemoryState {
    // insertion order doubles as listing order
    order: Vec<String>,
    files: HashMap<String, MemFile>,
    next_id: u64,
}

impl MemoryState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{:06}", self.next_id)
    }

    fn file(&self, file_id: &str) -> Result<&MemFile, ServiceError> {
        self.files
            .get(file_id)
            .ok_or_else(|| ServiceError::upstream("drive", 404, format!("File not found: {file_id}.")))
    }

    fn file_mut(&mut self, file_id: &str) -> Result<&mut MemFile, ServiceError> {
        self.files
            .get_mut(file_id)
            .ok_or_else(|| ServiceError::upstream("drive", 404, format!("File not found: {file_id}.")))
    }

    fn spreadsheet_mut(&mut self, spreadsheet_id: &str) -> Result<&mut MemFile, ServiceError> {
        self.files
            .get_mut(spreadsheet_id)
            .filter(|f| f.meta.mime_type.as_deref() == Some(SPREADSHEET_MIME_TYPE))
            .ok_or_else(|| ServiceError::upstream("sheets", 404, "Requested entity was not found."))
    }

    fn insert(&mut self, file: MemFile) -> FileMetadata {
        let meta = file.meta.clone();
        self.order.push(meta.id.clone());
        self.files.insert(meta.id.clone(), file);
        meta
    }
}

fn sheet_mut<'a>(file: &'a mut MemFile, title: &str) -> Result<&'a mut MemSheet, ServiceError> {
    file.sheets
        .iter_mut()
        .find(|s| s.title == title)
        .ok_or_else(|| ServiceError::upstream("sheets", 400, format!("Unable to parse range: {title}")))
}

fn last_filled_row(rows: &[Vec<String>]) -> usize {
    rows.iter()
        .rposition(|r| r.iter().any(|c| !c.is_empty()))
        .map(|i| i + 1)
        .unwrap_or(0)
}

fn cell_count(rows: &[Vec<String>]) -> u64 {
    rows.iter().map(|r| r.len() as u64).sum()
}

/// Both `FileStore` and `SheetsApi` over one shared in-memory state.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts a file has been shared with, in grant order.
    pub async fn permissions(&self, file_id: &str) -> Result<Vec<(String, ShareRole)>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.file(file_id)?.permissions.clone())
    }
}

#[async_trait]
impl FileStore for MemoryBackend {
    async fn create_file(&self, name: &str, mime_type: &str, parent: Option<&str>) -> Result<FileMetadata, ServiceError> {
        let mut state = self.state.write().await;
        if let Some(parent) = parent {
            state.file(parent)?;
        }
        let now = Utc::now();
        let id = state.next_id();
        let sheets = if mime_type == SPREADSHEET_MIME_TYPE {
            vec![MemSheet { sheet_id: 0, title: "Sheet1".into(), rows: vec![] }]
        } else {
            vec![]
        };
        let meta = FileMetadata {
            id,
            name: name.to_string(),
            kind: Some("drive#file".into()),
            mime_type: Some(mime_type.to_string()),
            created_time: Some(now),
            modified_time: Some(now),
            parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
        };
        Ok(state.insert(MemFile { meta, sheets, permissions: vec![] }))
    }

    async fn copy_file(&self, file_id: &str, name: &str, parent: &str) -> Result<FileMetadata, ServiceError> {
        let mut state = self.state.write().await;
        state.file(parent)?;
        let source = state.file(file_id)?.clone();
        let now = Utc::now();
        let id = state.next_id();
        let meta = FileMetadata {
            id,
            name: name.to_string(),
            created_time: Some(now),
            modified_time: Some(now),
            parents: vec![parent.to_string()],
            ..source.meta
        };
        Ok(state.insert(MemFile { meta, sheets: source.sheets, permissions: vec![] }))
    }

    async fn move_file(&self, file_id: &str, new_parent: &str) -> Result<FileMetadata, ServiceError> {
        let mut state = self.state.write().await;
        state.file(new_parent)?;
        let file = state.file_mut(file_id)?;
        file.meta.parents = vec![new_parent.to_string()];
        file.meta.modified_time = Some(Utc::now());
        Ok(file.meta.clone())
    }

    async fn list_files(&self, mime_type: Option<&str>, parent: Option<&str>) -> Result<Vec<FileMetadata>, ServiceError> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.files.get(id))
            .map(|f| &f.meta)
            .filter(|m| mime_type.map_or(true, |mt| m.mime_type.as_deref() == Some(mt)))
            .filter(|m| parent.map_or(true, |p| m.parents.iter().any(|x| x == p)))
            .cloned()
            .collect())
    }

    async fn get_file(&self, file_id: &str) -> Result<FileMetadata, ServiceError> {
        let state = self.state.read().await;
        Ok(state.file(file_id)?.meta.clone())
    }

    async fn get_parents(&self, file_id: &str) -> Result<Vec<String>, ServiceError> {
        let state = self.state.read().await;
        Ok(state.file(file_id)?.meta.parents.clone())
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        state.file(file_id)?;
        // children go with their folder, as on Drive
        let mut doomed = vec![file_id.to_string()];
        let mut i = 0;
        while i < doomed.len() {
            let current = doomed[i].clone();
            doomed.extend(
                state
                    .files
                    .values()
                    .filter(|f| f.meta.parents.contains(&current))
                    .map(|f| f.meta.id.clone()),
            );
            i += 1;
        }
        for id in &doomed {
            state.files.remove(id);
        }
        state.order.retain(|id| !doomed.contains(id));
        Ok(())
    }

    async fn share_file(&self, file_id: &str, email: &str, role: ShareRole) -> Result<(), ServiceError> {
        if !email.contains('@') {
            return Err(ServiceError::upstream("drive", 400, "Bad Request. User message: \"Invalid email address.\""));
        }
        let mut state = self.state.write().await;
        let file = state.file_mut(file_id)?;
        file.permissions.push((email.to_string(), role));
        Ok(())
    }
}

#[async_trait]
impl SheetsApi for MemoryBackend {
    async fn get_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<Vec<Vec<String>>, ServiceError> {
        let mut state = self.state.write().await;
        let file = state.spreadsheet_mut(spreadsheet_id)?;
        let sheet = sheet_mut(file, &range.sheet)?;
        let first = range.first_row.unwrap_or(1).max(1) as usize - 1;
        let last = range.last_row.map(|l| l as usize).unwrap_or(usize::MAX);
        let end = last_filled_row(&sheet.rows).min(last);
        if first >= end {
            return Ok(vec![]);
        }
        Ok(sheet.rows[first..end]
            .iter()
            .map(|row| {
                let width = row.iter().rposition(|c| !c.is_empty()).map(|i| i + 1).unwrap_or(0);
                row[..width].to_vec()
            })
            .collect())
    }

    async fn append_values(&self, spreadsheet_id: &str, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<u64, ServiceError> {
        let mut state = self.state.write().await;
        let file = state.spreadsheet_mut(spreadsheet_id)?;
        let sheet = sheet_mut(file, &range.sheet)?;
        let written = cell_count(&rows);
        let end = last_filled_row(&sheet.rows);
        sheet.rows.truncate(end);
        sheet.rows.extend(rows);
        Ok(written)
    }

    async fn update_values(&self, spreadsheet_id: &str, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<u64, ServiceError> {
        let mut state = self.state.write().await;
        let file = state.spreadsheet_mut(spreadsheet_id)?;
        let sheet = sheet_mut(file, &range.sheet)?;
        let written = cell_count(&rows);
        let start = range.first_row.unwrap_or(1).max(1) as usize - 1;
        for (offset, row) in rows.into_iter().enumerate() {
            let at = start + offset;
            if sheet.rows.len() <= at {
                sheet.rows.resize(at + 1, vec![]);
            }
            sheet.rows[at] = row;
        }
        Ok(written)
    }

    async fn clear_values(&self, spreadsheet_id: &str, range: &SheetRange) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        let file = state.spreadsheet_mut(spreadsheet_id)?;
        let sheet = sheet_mut(file, &range.sheet)?;
        let first = range.first_row.unwrap_or(1).max(1) as usize - 1;
        let last = range.last_row.map(|l| l as usize).unwrap_or(usize::MAX);
        for row in sheet.rows.iter_mut().skip(first).take(last.saturating_sub(first)) {
            row.iter_mut().for_each(String::clear);
        }
        Ok(())
    }

    async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, ServiceError> {
        let mut state = self.state.write().await;
        let file = state.spreadsheet_mut(spreadsheet_id)?;
        Ok(file
            .sheets
            .iter()
            .map(|s| SheetProperties { sheet_id: s.sheet_id, title: s.title.clone() })
            .collect())
    }

    async fn batch_update(&self, spreadsheet_id: &str, requests: Vec<SheetRequest>) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        let file = state.spreadsheet_mut(spreadsheet_id)?;
        // all-or-nothing, like the real batch endpoint
        let mut sheets = file.sheets.clone();
        for request in requests {
            match request {
                SheetRequest::AddSheet { title, index } => {
                    if sheets.iter().any(|s| s.title == title) {
                        return Err(ServiceError::upstream(
                            "sheets",
                            400,
                            format!("Invalid requests[0].addSheet: A sheet with the name \"{title}\" already exists."),
                        ));
                    }
                    let sheet_id = sheets.iter().map(|s| s.sheet_id).max().unwrap_or(0) + 1;
                    let at = index.min(sheets.len());
                    sheets.insert(at, MemSheet { sheet_id, title, rows: vec![] });
                }
                SheetRequest::DeleteSheet { sheet_id } => {
                    let pos = sheets.iter().position(|s| s.sheet_id == sheet_id).ok_or_else(|| {
                        ServiceError::upstream("sheets", 400, format!("No sheet with id: {sheet_id}"))
                    })?;
                    if sheets.len() == 1 {
                        return Err(ServiceError::upstream(
                            "sheets",
                            400,
                            "You can't remove all the sheets in a document.",
                        ));
                    }
                    sheets.remove(pos);
                }
                SheetRequest::DeleteRows { sheet_id, start, end } => {
                    let sheet = sheets.iter_mut().find(|s| s.sheet_id == sheet_id).ok_or_else(|| {
                        ServiceError::upstream("sheets", 400, format!("No grid with id: {sheet_id}"))
                    })?;
                    let len = sheet.rows.len();
                    let (start, end) = (start.min(len), end.min(len));
                    if start < end {
                        sheet.rows.drain(start..end);
                    }
                }
            }
        }
        file.sheets = sheets;
        file.meta.modified_time = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::FOLDER_MIME_TYPE;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn new_spreadsheet_has_default_sheet() {
        let mem = MemoryBackend::new();
        let f = mem.create_spreadsheet("Plan", None).await.expect("create");
        let sheets = mem.list_sheets(&f.id).await.expect("sheets");
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].sheet_id, 0);
    }

    #[tokio::test]
    async fn listing_filters_by_mime_and_parent() {
        let mem = MemoryBackend::new();
        let root = mem.create_folder("Root", None).await.expect("root");
        let _inner = mem.create_folder("Inner", Some(&root.id)).await.expect("inner");
        let _sheet = mem.create_spreadsheet("Plan", Some(&root.id)).await.expect("sheet");

        let folders = mem.list_files(Some(FOLDER_MIME_TYPE), None).await.expect("list");
        assert_eq!(folders.len(), 2);
        let in_root = mem.list_files(None, Some(&root.id)).await.expect("list");
        assert_eq!(in_root.len(), 2);
        let sheets = mem.list_spreadsheets(Some(&root.id)).await.expect("list");
        assert_eq!(sheets.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_a_404() {
        let mem = MemoryBackend::new();
        let err = mem.get_file("nope").await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(404));
    }

    #[tokio::test]
    async fn append_lands_after_last_filled_row_and_clear_keeps_header() {
        let mem = MemoryBackend::new();
        let f = mem.create_spreadsheet("Plan", None).await.expect("create");
        let r = SheetRange::whole("Sheet1");
        mem.append_values(&f.id, &r, vec![row(&["name", "cost"])]).await.expect("header");
        mem.append_values(&f.id, &r, vec![row(&["a", "1"]), row(&["b", ""])]).await.expect("rows");
        let values = mem.get_values(&f.id, &r).await.expect("get");
        assert_eq!(values, vec![row(&["name", "cost"]), row(&["a", "1"]), row(&["b"])]);

        mem.clear_values(&f.id, &SheetRange::rows_from("Sheet1", 2)).await.expect("clear");
        assert_eq!(mem.get_values(&f.id, &r).await.expect("get"), vec![row(&["name", "cost"])]);

        let written = mem.append_values(&f.id, &r, vec![row(&["c", "3"])]).await.expect("append");
        assert_eq!(written, 2);
        let values = mem.get_values(&f.id, &r).await.expect("get");
        assert_eq!(values.len(), 2);
        assert_eq!(values[1], row(&["c", "3"]));
    }

    #[tokio::test]
    async fn delete_rows_shifts_later_rows_up() {
        let mem = MemoryBackend::new();
        let f = mem.create_spreadsheet("Plan", None).await.expect("create");
        let r = SheetRange::whole("Sheet1");
        mem.append_values(&f.id, &r, vec![row(&["h"]), row(&["a"]), row(&["b"]), row(&["c"])])
            .await
            .expect("rows");
        mem.batch_update(&f.id, vec![SheetRequest::DeleteRows { sheet_id: 0, start: 2, end: 3 }])
            .await
            .expect("delete");
        let values = mem.get_values(&f.id, &r).await.expect("get");
        assert_eq!(values, vec![row(&["h"]), row(&["a"]), row(&["c"])]);
    }

    #[tokio::test]
    async fn failed_batch_leaves_sheets_untouched() {
        let mem = MemoryBackend::new();
        let f = mem.create_spreadsheet("Plan", None).await.expect("create");
        let err = mem
            .batch_update(
                &f.id,
                vec![
                    SheetRequest::AddSheet { title: "x".into(), index: 0 },
                    SheetRequest::AddSheet { title: "x".into(), index: 1 },
                ],
            )
            .await
            .unwrap_err();
        assert_eq!(err.upstream_status(), Some(400));
        assert_eq!(mem.list_sheets(&f.id).await.expect("sheets").len(), 1);
    }

    #[tokio::test]
    async fn copy_keeps_sheet_contents() {
        let mem = MemoryBackend::new();
        let dest = mem.create_folder("Dest", None).await.expect("folder");
        let src = mem.create_spreadsheet("Template", None).await.expect("create");
        mem.append_values(&src.id, &SheetRange::whole("Sheet1"), vec![row(&["name"])])
            .await
            .expect("header");
        let copy = mem.copy_file(&src.id, "Copy", &dest.id).await.expect("copy");
        assert_eq!(copy.parents, vec![dest.id.clone()]);
        let values = mem.get_values(&copy.id, &SheetRange::whole("Sheet1")).await.expect("get");
        assert_eq!(values, vec![row(&["name"])]);
    }

    #[tokio::test]
    async fn deleting_a_folder_removes_its_children() {
        let mem = MemoryBackend::new();
        let root = mem.create_folder("Root", None).await.expect("root");
        let child = mem.create_spreadsheet("Plan", Some(&root.id)).await.expect("child");
        mem.delete_file(&root.id).await.expect("delete");
        assert!(mem.get_file(&child.id).await.is_err());
        assert!(mem.list_files(None, None).await.expect("list").is_empty());
    }
}
