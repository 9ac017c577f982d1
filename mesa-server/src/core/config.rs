use std::path::PathBuf;

/// Server configuration - everything an edge node needs at boot
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/mesa | working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | PUBLIC_URL | http://localhost:3000 | base URL embedded in QR payloads |
/// | QR_EXPIRY_SECS | 14400 | QR token lifetime |
/// | SESSION_EXPIRY_SECS | 14400 | guest session lifetime |
/// | MIN_SONG_SPEND | 600000 | table spend gate for song requests (minor units) |
/// | CATALOG_PATH | {WORK_DIR}/catalog.json | menu + table registry file |
/// | ENVIRONMENT | development | development \| staging \| production |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/mesa HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Public base URL used to build the QR access URL
    pub public_url: String,
    /// QR token lifetime in seconds
    pub qr_expiry_secs: i64,
    /// Guest session lifetime in seconds
    pub session_expiry_secs: i64,
    /// Minimum table spend (currency minor units) to request a song
    pub min_song_spend: i64,
    /// Path to the catalog JSON file (tables + menu)
    pub catalog_path: Option<String>,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/mesa".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            public_url: std::env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            qr_expiry_secs: std::env::var("QR_EXPIRY_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(14_400),
            session_expiry_secs: std::env::var("SESSION_EXPIRY_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(14_400),
            min_song_spend: std::env::var("MIN_SONG_SPEND")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(600_000),
            catalog_path: std::env::var("CATALOG_PATH").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Database directory: {work_dir}/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Database file path
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("mesa.redb")
    }

    /// Log directory: {work_dir}/logs
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Resolved catalog file path
    pub fn catalog_file(&self) -> PathBuf {
        match &self.catalog_path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.work_dir).join("catalog.json"),
        }
    }

    /// Create the work directory tree if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
