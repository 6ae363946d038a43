use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

/// Minimum HMAC-SHA256 key length in bytes (256 bits).
pub const MIN_JWT_KEY_LEN: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_JWT_EXPIRY_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

/// Token signing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            issuer: default_issuer(),
            audience: default_audience(),
            expiry_minutes: default_expiry_minutes(),
        }
    }
}

fn default_issuer() -> String { "auth-server".into() }
fn default_audience() -> String { "auth-clients".into() }
fn default_expiry_minutes() -> i64 { 60 }

/// Password rules applied at registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub required_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
    pub required_unique_chars: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            required_length: 8,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
            required_unique_chars: 1,
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
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
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is absent, then apply env overrides and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.validate()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.jwt.normalize_from_env();
        self.jwt.validate()?;
        self.password.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if let Some(url) = std::env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty()) {
            self.url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl JwtConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(key) = std::env::var("JWT_KEY") {
            self.key = key;
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            self.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("JWT_AUDIENCE") {
            self.audience = audience;
        }
        if let Some(minutes) = std::env::var("JWT_EXPIRY_MINUTES").ok().and_then(|m| m.parse::<i64>().ok()) {
            self.expiry_minutes = minutes;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.key.len() < MIN_JWT_KEY_LEN {
            return Err(anyhow!("jwt.key must be at least {MIN_JWT_KEY_LEN} bytes; set it in config.toml or JWT_KEY"));
        }
        if self.issuer.trim().is_empty() || self.audience.trim().is_empty() {
            return Err(anyhow!("jwt.issuer and jwt.audience must not be empty"));
        }
        if !(1..=MAX_JWT_EXPIRY_MINUTES).contains(&self.expiry_minutes) {
            return Err(anyhow!("jwt.expiry_minutes must be in 1..={MAX_JWT_EXPIRY_MINUTES}"));
        }
        Ok(())
    }
}

impl PasswordConfig {
    pub fn validate(&self) -> Result<()> {
        if self.required_length == 0 {
            return Err(anyhow!("password.required_length must be >= 1"));
        }
        Ok(())
    }
}
