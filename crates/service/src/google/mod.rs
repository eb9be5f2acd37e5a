//! REST clients for Google Drive v3 and Google Sheets v4.

pub mod auth;
pub mod http;
pub mod drive;
pub mod sheets;

pub use auth::{StaticToken, TokenProvider};
pub use drive::GoogleDrive;
pub use http::GoogleHttp;
pub use sheets::GoogleSheets;
