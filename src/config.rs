/*
 * Responsibility
 * - 環境変数や設定の読み込み (Firebase Admin 資格情報、CORS 許可、保護パスなど)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

use crate::services::identity::firebase::MAX_LEEWAY_SECONDS;
use crate::services::identity::keys::GOOGLE_SECURETOKEN_JWKS_URL;

pub const DEFAULT_PROTECTED_PREFIXES: [&str; 2] = ["/api", "/batch"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub protected_path_prefixes: Vec<String>,

    pub firebase_project_id: String,
    pub firebase_client_email: String,
    // PEM with real newlines (`\n` escapes already expanded)
    pub firebase_private_key_pem: String,
    pub firebase_jwks_url: Url,
    pub id_token_leeway_seconds: u64,
}

// Required values must be present and non-blank.
fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_prefixes(raw: &str) -> Result<Vec<String>, ConfigError> {
    let prefixes = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    if prefixes.iter().any(|p| !p.starts_with('/')) {
        return Err(ConfigError::Invalid("PROTECTED_PATH_PREFIXES"));
    }

    Ok(prefixes)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        // Fail fast on the credential before anything else.
        let firebase_project_id = required("FIREBASE_ADMIN_PROJECT_ID")?;
        let firebase_client_email = required("FIREBASE_ADMIN_CLIENT_EMAIL")?;
        let firebase_private_key_pem =
            required("FIREBASE_ADMIN_PRIVATE_KEY")?.replace("\\n", "\n");

        let port: u16 = match std::env::var("PORT") {
            Ok(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            Err(_) => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let mut protected_path_prefixes =
            parse_prefixes(&std::env::var("PROTECTED_PATH_PREFIXES").unwrap_or_default())?;
        if protected_path_prefixes.is_empty() {
            protected_path_prefixes = DEFAULT_PROTECTED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect();
        }

        let firebase_jwks_url = std::env::var("FIREBASE_JWKS_URL")
            .unwrap_or_else(|_| GOOGLE_SECURETOKEN_JWKS_URL.to_string());
        let firebase_jwks_url =
            Url::parse(&firebase_jwks_url).map_err(|_| ConfigError::Invalid("FIREBASE_JWKS_URL"))?;

        let id_token_leeway_seconds: u64 = match std::env::var("ID_TOKEN_LEEWAY_SECONDS") {
            Ok(s) => s
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs <= MAX_LEEWAY_SECONDS)
                .ok_or(ConfigError::Invalid("ID_TOKEN_LEEWAY_SECONDS"))?,
            Err(_) => 60,
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            protected_path_prefixes,
            firebase_project_id,
            firebase_client_email,
            firebase_private_key_pem,
            firebase_jwks_url,
            id_token_leeway_seconds,
        })
    }
}
