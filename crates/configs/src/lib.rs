use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            frontend_dir: default_frontend_dir(),
            log_format: default_log_format(),
        }
    }
}

/// Which file/spreadsheet backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Google,
    /// In-process store seeded with the folder layout; nothing leaves the process.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Bearer token for the Drive/Sheets APIs, minted outside this process.
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub folders: FolderNames,
    #[serde(default = "default_template_name")]
    pub template_name: String,
    /// Account the bootstrap command shares the root folder with.
    #[serde(default)]
    pub project_owner: Option<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            access_token: String::new(),
            drive_base_url: default_drive_base_url(),
            sheets_base_url: default_sheets_base_url(),
            request_timeout_secs: default_request_timeout(),
            folders: FolderNames::default(),
            template_name: default_template_name(),
            project_owner: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FolderNames {
    pub itineraries: String,
    pub archives: String,
    pub templates: String,
}

impl Default for FolderNames {
    fn default() -> Self {
        Self {
            itineraries: "Itineraries".into(),
            archives: "Archives".into(),
            templates: "Templates".into(),
        }
    }
}

fn default_frontend_dir() -> String { "frontend".into() }
fn default_log_format() -> String { "compact".into() }
fn default_drive_base_url() -> String { "https://www.googleapis.com/drive/v3".into() }
fn default_sheets_base_url() -> String { "https://sheets.googleapis.com/v4".into() }
fn default_request_timeout() -> u64 { 30 }
fn default_template_name() -> String { "Itinerary".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Like `load_and_validate`, but a missing or unreadable config file falls
    /// back to defaults plus environment variables.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.google.normalize_from_env();
        self.google.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.worker_threads.is_none() {
            self.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok());
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.frontend_dir.trim().is_empty() {
            self.frontend_dir = default_frontend_dir();
        }
        Ok(())
    }
}

impl GoogleConfig {
    pub fn normalize_from_env(&mut self) {
        // env wins over an empty token in the TOML file
        if self.access_token.trim().is_empty() {
            if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
                self.access_token = token;
            }
        }
        if let Ok(backend) = std::env::var("ITINERARY_BACKEND") {
            match backend.to_ascii_lowercase().as_str() {
                "memory" => self.backend = Backend::Memory,
                "google" => self.backend = Backend::Google,
                _ => {}
            }
        }
        if self.project_owner.is_none() {
            self.project_owner = std::env::var("PROJECT_OWNER").ok().filter(|s| !s.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == Backend::Google && self.access_token.trim().is_empty() {
            return Err(anyhow!(
                "google.access_token is empty; set it in config.toml or GOOGLE_ACCESS_TOKEN"
            ));
        }
        for (key, url) in [("drive_base_url", &self.drive_base_url), ("sheets_base_url", &self.sheets_base_url)] {
            let lower = url.to_lowercase();
            if !(lower.starts_with("https://") || lower.starts_with("http://")) {
                return Err(anyhow!("google.{key} must start with http:// or https://"));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("google.request_timeout_secs must be a positive number of seconds"));
        }
        let f = &self.folders;
        if [&f.itineraries, &f.archives, &f.templates, &self.template_name]
            .iter()
            .any(|n| n.trim().is_empty())
        {
            return Err(anyhow!("folder and template names must not be empty"));
        }
        if f.itineraries == f.archives || f.itineraries == f.templates || f.archives == f.templates {
            return Err(anyhow!("google.folders names must be distinct"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = load_from_str("").expect("parse");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.google.backend, Backend::Google);
        assert_eq!(cfg.google.folders.archives, "Archives");
        assert_eq!(cfg.google.template_name, "Itinerary");
    }

    #[test]
    fn parses_memory_backend_and_folders() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [google]
            backend = "memory"
            template_name = "Base"

            [google.folders]
            itineraries = "Trips"
            archives = "Old Trips"
            templates = "Blueprints"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.google.backend, Backend::Memory);
        assert_eq!(cfg.google.folders.itineraries, "Trips");
        assert!(cfg.google.validate().is_ok());
    }

    #[test]
    fn google_backend_requires_token() {
        let g = GoogleConfig::default();
        assert!(g.validate().is_err());
        let g = GoogleConfig { access_token: "ya29.token".into(), ..GoogleConfig::default() };
        assert!(g.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_folder_names() {
        let g = GoogleConfig {
            backend: Backend::Memory,
            folders: FolderNames { itineraries: "A".into(), archives: "A".into(), templates: "T".into() },
            ..GoogleConfig::default()
        };
        assert!(g.validate().is_err());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let g = GoogleConfig {
            backend: Backend::Memory,
            sheets_base_url: "ftp://sheets".into(),
            ..GoogleConfig::default()
        };
        assert!(g.validate().is_err());
    }
}
