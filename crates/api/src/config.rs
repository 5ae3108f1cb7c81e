use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Google Sheets store. Leaving the spreadsheet id or the credentials
    /// empty puts the service in log-only mode.
    #[serde(default)]
    pub sheets: SheetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Origins allowed to call the API. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Send Strict-Transport-Security; only behind HTTPS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

/// Google Sheets store configuration.
#[derive(Clone, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet id from the sheet URL.
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Service account key: inline JSON or a path to the key file.
    #[serde(default)]
    pub credentials: String,

    /// Sheet that should receive RSVP rows.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Sheets API base URL.
    #[serde(default = "default_sheets_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in milliseconds for token and Sheets calls.
    #[serde(default = "default_sheets_timeout_ms")]
    pub timeout_ms: u64,
}

impl SheetsConfig {
    /// Both the spreadsheet id and the credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.spreadsheet_id.trim().is_empty() && !self.credentials.trim().is_empty()
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            credentials: String::new(),
            sheet_name: default_sheet_name(),
            api_base_url: default_sheets_api_base_url(),
            timeout_ms: default_sheets_timeout_ms(),
        }
    }
}

// Keeps the key material out of startup logs.
impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field(
                "credentials",
                &if self.credentials.is_empty() {
                    "<unset>"
                } else {
                    "<redacted>"
                },
            )
            .field("sheet_name", &self.sheet_name)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_sheet_name() -> String {
    "RSVP Responses".to_string()
}
fn default_sheets_api_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}
fn default_sheets_timeout_ms() -> u64 {
    10000
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with RSVP__ prefix
    /// 4. GOOGLE_SPREADSHEET_ID and GOOGLE_CREDENTIALS, when set
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("RSVP").separator("__"))
            .set_override_option(
                "sheets.spreadsheet_id",
                std::env::var("GOOGLE_SPREADSHEET_ID").ok(),
            )?
            .set_override_option("sheets.credentials", std::env::var("GOOGLE_CREDENTIALS").ok())?
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults and overrides without
    /// touching the file system or the environment.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            hsts_enabled = false

            [sheets]
            spreadsheet_id = ""
            credentials = ""
            sheet_name = "RSVP Responses"
            api_base_url = "https://sheets.googleapis.com/v4"
            timeout_ms = 10000
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.sheets.sheet_name.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "RSVP__SHEETS__SHEET_NAME must not be empty".to_string(),
            ));
        }

        if self.sheets.timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "sheets.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.sheets.is_configured() && reqwest::Url::parse(&self.sheets.api_base_url).is_err() {
            return Err(ConfigValidationError::InvalidValue(format!(
                "sheets.api_base_url is not a valid URL: {}",
                self.sheets.api_base_url
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}: {}",
                    self.server.host, self.server.port, e
                ))
            })
    }
}
