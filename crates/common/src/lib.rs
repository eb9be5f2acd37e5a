pub mod types;
pub mod utils;
pub mod env;

/// Mime type Google Drive assigns to folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
/// Mime type Google Drive assigns to native spreadsheets.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn health_serializes_status() {
        let json = serde_json::to_value(types::Health { status: "ok" }).expect("serialize");
        assert_eq!(json["status"], "ok");
    }
}
