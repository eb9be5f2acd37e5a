use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use models::FileMetadata;

use crate::errors::ServiceError;
use crate::google::http::{endpoint, parse_base, GoogleHttp};
use crate::store::{FileStore, ShareRole};

const API: &str = "drive";
const FILE_FIELDS: &str = "id,name,kind,mimeType,createdTime,modifiedTime,parents";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileMetadata>,
}

#[derive(Debug, Deserialize)]
struct Parents {
    #[serde(default)]
    parents: Vec<String>,
}

/// Drive v3 client.
pub struct GoogleDrive {
    http: GoogleHttp,
    base: Url,
}

impl GoogleDrive {
    pub fn new(http: GoogleHttp, base_url: &str) -> Result<Self, ServiceError> {
        Ok(Self { http, base: parse_base(base_url)? })
    }

    fn files_url(&self, tail: &[&str]) -> Result<Url, ServiceError> {
        let mut segments = vec!["files"];
        segments.extend_from_slice(tail);
        endpoint(&self.base, &segments)
    }
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Drive search expression for non-trashed files, optionally by mime type and parent.
pub fn drive_query(mime_type: Option<&str>, parent: Option<&str>) -> String {
    let mut clauses = vec!["trashed = false".to_string()];
    if let Some(mime) = mime_type {
        clauses.push(format!("mimeType = '{}'", escape_query_value(mime)));
    }
    if let Some(parent) = parent {
        clauses.push(format!("'{}' in parents", escape_query_value(parent)));
    }
    clauses.join(" and ")
}

#[async_trait]
impl FileStore for GoogleDrive {
    async fn create_file(&self, name: &str, mime_type: &str, parent: Option<&str>) -> Result<FileMetadata, ServiceError> {
        let mut body = json!({ "name": name, "mimeType": mime_type });
        if let Some(parent) = parent {
            body["parents"] = json!([parent]);
        }
        let req = self
            .http
            .client()
            .post(self.files_url(&[])?)
            .query(&[("fields", FILE_FIELDS)])
            .json(&body);
        let file: FileMetadata = self.http.send_json(API, req).await?;
        info!(file_id = %file.id, %name, "created file");
        Ok(file)
    }

    async fn copy_file(&self, file_id: &str, name: &str, parent: &str) -> Result<FileMetadata, ServiceError> {
        let req = self
            .http
            .client()
            .post(self.files_url(&[file_id, "copy"])?)
            .query(&[("fields", FILE_FIELDS)])
            .json(&json!({ "name": name, "parents": [parent] }));
        let file: FileMetadata = self.http.send_json(API, req).await?;
        info!(source_id = %file_id, file_id = %file.id, %parent, "copied file");
        Ok(file)
    }

    async fn move_file(&self, file_id: &str, new_parent: &str) -> Result<FileMetadata, ServiceError> {
        let current = self.get_parents(file_id).await?;
        let remove = current
            .iter()
            .filter(|p| p.as_str() != new_parent)
            .cloned()
            .collect::<Vec<_>>()
            .join(",");
        let mut query = vec![("fields", FILE_FIELDS), ("addParents", new_parent)];
        if !remove.is_empty() {
            query.push(("removeParents", remove.as_str()));
        }
        let req = self
            .http
            .client()
            .patch(self.files_url(&[file_id])?)
            .query(&query)
            .json(&json!({}));
        let file: FileMetadata = self.http.send_json(API, req).await?;
        info!(%file_id, %new_parent, "moved file");
        Ok(file)
    }

    async fn list_files(&self, mime_type: Option<&str>, parent: Option<&str>) -> Result<Vec<FileMetadata>, ServiceError> {
        let q = drive_query(mime_type, parent);
        let fields = format!("files({FILE_FIELDS})");
        let req = self
            .http
            .client()
            .get(self.files_url(&[])?)
            .query(&[("q", q.as_str()), ("fields", fields.as_str()), ("pageSize", "1000")]);
        let list: FileList = self.http.send_json(API, req).await?;
        Ok(list.files)
    }

    async fn get_file(&self, file_id: &str) -> Result<FileMetadata, ServiceError> {
        let req = self
            .http
            .client()
            .get(self.files_url(&[file_id])?)
            .query(&[("fields", FILE_FIELDS)]);
        self.http.send_json(API, req).await
    }

    async fn get_parents(&self, file_id: &str) -> Result<Vec<String>, ServiceError> {
        let req = self
            .http
            .client()
            .get(self.files_url(&[file_id])?)
            .query(&[("fields", "parents")]);
        let parents: Parents = self.http.send_json(API, req).await?;
        Ok(parents.parents)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), ServiceError> {
        let req = self.http.client().delete(self.files_url(&[file_id])?);
        self.http.send_empty(API, req).await?;
        info!(%file_id, "deleted file");
        Ok(())
    }

    async fn share_file(&self, file_id: &str, email: &str, role: ShareRole) -> Result<(), ServiceError> {
        let req = self
            .http
            .client()
            .post(self.files_url(&[file_id, "permissions"])?)
            .query(&[("fields", "id")])
            .json(&json!({ "type": "user", "role": role.as_str(), "emailAddress": email }));
        self.http.send_empty(API, req).await?;
        info!(%file_id, role = role.as_str(), "shared file");
        Ok(())
    }
}
