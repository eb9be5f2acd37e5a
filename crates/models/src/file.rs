use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File metadata as reported by the file store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_drive_payload() {
        let raw = r#"{
            "name": "Test Itinerary",
            "id": "159YsZTIXvW5GbKNQnI9LSqPqmXhWoxIl_59YpisKrxM",
            "kind": "drive#file",
            "mimeType": "application/vnd.google-apps.spreadsheet",
            "createdTime": "2024-11-22T15:29:44.226Z",
            "modifiedTime": "2024-11-24T15:39:20.537Z"
        }"#;
        let f: FileMetadata = serde_json::from_str(raw).expect("parse");
        assert_eq!(f.kind.as_deref(), Some("drive#file"));
        assert!(f.created_time.is_some());
        assert!(f.parents.is_empty());

        let out = serde_json::to_value(&f).expect("serialize");
        assert!(out.get("parents").is_none());
        assert_eq!(out["mimeType"], "application/vnd.google-apps.spreadsheet");
    }
}
