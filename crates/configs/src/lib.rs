use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Upload size cap applied in memory buffering mode when none is configured.
pub const DEFAULT_MEMORY_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

fn default_host() -> String { "0.0.0.0".into() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: 3000, worker_threads: Some(4) }
    }
}

/// Managed backend (object storage + table API share one base URL and key).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_cache_control")]
    pub cache_control_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            key_prefix: default_key_prefix(),
            cache_control_secs: default_cache_control(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { table: default_table() }
    }
}

/// Where an upload is held between multipart intake and the store call.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BufferMode {
    #[default]
    Disk,
    Memory,
}

impl std::str::FromStr for BufferMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disk" => Ok(BufferMode::Disk),
            "memory" => Ok(BufferMode::Memory),
            other => Err(anyhow!("unknown buffering mode `{other}` (expected disk or memory)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_field_name")]
    pub field_name: String,
    #[serde(default)]
    pub buffering: BufferMode,
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    /// Remove the stored object again when the metadata insert fails.
    #[serde(default)]
    pub delete_orphans: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
            buffering: BufferMode::default(),
            temp_dir: None,
            max_file_size: None,
            delete_orphans: false,
        }
    }
}

fn default_timeout() -> u64 { 30 }
fn default_bucket() -> String { "photos".into() }
fn default_table() -> String { "photos".into() }
fn default_key_prefix() -> String { "public/".into() }
fn default_cache_control() -> u64 { 3600 }
fn default_field_name() -> String { "photo".into() }

/// Load `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(%path, "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(anyhow!("cannot read {path}: {e}")),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// `.env` → config file → environment overrides → validation.
    pub fn load_and_validate() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut cfg = load_default()?;
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|k| std::env::var(k).ok());
    }

    /// Apply overrides from a lookup function; unparsable values are ignored.
    pub fn apply_env_with<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = get("SUPABASE_URL") {
            self.backend.url = url;
        }
        if let Some(key) = get("SUPABASE_KEY") {
            self.backend.key = key;
        }
        if let Some(host) = get("SERVER_HOST") {
            self.server.host = host;
        }
        let port = get("SERVER_PORT").or_else(|| get("PORT"));
        if let Some(p) = port.and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = p;
        }
        if let Some(mode) = get("UPLOAD_BUFFERING") {
            match mode.parse() {
                Ok(m) => self.upload.buffering = m,
                Err(e) => tracing::warn!(error = %e, "ignoring UPLOAD_BUFFERING"),
            }
        }
        if let Some(dir) = get("UPLOAD_TEMP_DIR") {
            self.upload.temp_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.backend.normalize_and_validate()?;
        self.storage.normalize_and_validate()?;
        if self.database.table.trim().is_empty() {
            return Err(anyhow!("database.table must not be empty"));
        }
        self.database.table = self.database.table.trim().to_string();
        if self.upload.field_name.trim().is_empty() {
            return Err(anyhow!("upload.field_name must not be empty"));
        }
        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl BackendConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        let url = self.url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(anyhow!("backend.url is empty; set it in config.toml or SUPABASE_URL"));
        }
        let lower = url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("backend.url must start with http:// or https://"));
        }
        self.url = url;
        if self.key.trim().is_empty() {
            return Err(anyhow!("backend.key is empty; set it in config.toml or SUPABASE_KEY"));
        }
        self.key = self.key.trim().to_string();
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout();
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        self.bucket = self.bucket.trim().to_string();
        if self.bucket.is_empty() {
            return Err(anyhow!("storage.bucket must not be empty"));
        }
        let prefix = self.key_prefix.trim().trim_start_matches('/');
        self.key_prefix = if prefix.is_empty() || prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };
        Ok(())
    }
}

impl UploadConfig {
    /// Configured cap, or 10 MiB in memory mode; disk mode is unbounded by default.
    pub fn effective_max_file_size(&self) -> Option<u64> {
        match (self.max_file_size, self.buffering) {
            (Some(n), _) => Some(n),
            (None, BufferMode::Memory) => Some(DEFAULT_MEMORY_MAX_FILE_SIZE),
            (None, BufferMode::Disk) => None,
        }
    }

    pub fn effective_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("photo-uploads"))
    }
}
