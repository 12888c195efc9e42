use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Tokio worker threads; 0 lets the runtime decide.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info,sqlx=warn".to_string(),
            worker_threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5080,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:storefront.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HMAC secret for signing access tokens. Must be provided via
    /// config or the `STOREFRONT_JWT_SECRET` environment variable.
    pub secret: String,

    pub valid_issuer: String,

    pub valid_audience: String,

    pub access_token_validity_minutes: i64,

    pub refresh_token_validity_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            valid_issuer: "http://localhost:5080".to_string(),
            valid_audience: "http://localhost:4200".to_string(),
            access_token_validity_minutes: 30,
            refresh_token_validity_minutes: 1440,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,

    pub email: String,

    /// Seed password for the admin user. Must be provided via config or
    /// the `STOREFRONT_ADMIN_PASSWORD` environment variable.
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: String::new(),
            password: String::new(),
        }
    }
}

impl Config {
    /// Load `config.toml` when present, then apply environment overrides
    /// for the secrets that should not live in the file.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = if Path::new(CONFIG_FILE).exists() {
            let contents = std::fs::read_to_string(CONFIG_FILE)
                .with_context(|| format!("Failed to read {CONFIG_FILE}"))?;
            toml::from_str(&contents).with_context(|| format!("Failed to parse {CONFIG_FILE}"))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("STOREFRONT_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("STOREFRONT_JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Ok(issuer) = std::env::var("STOREFRONT_JWT_ISSUER") {
            self.jwt.valid_issuer = issuer;
        }
        if let Ok(audience) = std::env::var("STOREFRONT_JWT_AUDIENCE") {
            self.jwt.valid_audience = audience;
        }
        if let Ok(email) = std::env::var("STOREFRONT_ADMIN_EMAIL") {
            self.admin.email = email;
        }
        if let Ok(password) = std::env::var("STOREFRONT_ADMIN_PASSWORD") {
            self.admin.password = password;
        }
        if let Ok(port) = std::env::var("STOREFRONT_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt.secret.trim().is_empty() {
            bail!("JWT secret is not configured (set [jwt].secret or STOREFRONT_JWT_SECRET)");
        }
        if self.jwt.access_token_validity_minutes <= 0 {
            bail!("Access token validity must be a positive number of minutes");
        }
        if self.jwt.refresh_token_validity_minutes <= 0 {
            bail!("Refresh token validity must be a positive number of minutes");
        }
        if self.admin.password.trim().is_empty() {
            bail!("Admin password is not configured (set [admin].password or STOREFRONT_ADMIN_PASSWORD)");
        }
        Ok(())
    }
}
