//! Signing keys for Firebase ID tokens.
//!
//! Google publishes the securetoken signing keys as a JWK set and rotates them
//! regularly. The response carries `Cache-Control: max-age=...`, which we use as
//! the cache lifetime. An unknown `kid` triggers one early refresh (rate limited)
//! so a freshly rotated key is picked up without waiting for expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, jwk::JwkSet};
use reqwest::header::{CACHE_CONTROL, HeaderMap};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use url::Url;

pub const GOOGLE_SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

// Used when the key endpoint does not send a usable max-age.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);
// Lower bound between two refreshes caused by an unknown kid.
const MIN_FORCED_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("key set request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("key set endpoint returned {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid key set: {0}")]
    InvalidKeySet(String),
}

/// Resolves a token header `kid` to the key that verifies its signature.
///
/// Returns:
/// - `Ok(Some(_))` => key known
/// - `Ok(None)`    => no such key (the token is not ours, or the key was retired)
/// - `Err(_)`      => the source itself failed; callers must not treat this as a bad token
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn decoding_key(&self, kid: &str) -> Result<Option<DecodingKey>, KeySourceError>;
}

/// Build `kid -> DecodingKey` from a JWK set. Keys without `kid` or with
/// unsupported parameters are skipped; an empty result is an error.
pub fn decoding_keys(set: &JwkSet) -> Result<HashMap<String, DecodingKey>, KeySourceError> {
    let mut keys = HashMap::with_capacity(set.keys.len());

    for jwk in &set.keys {
        let Some(kid) = jwk.common.key_id.clone() else {
            tracing::warn!("skipping signing key without kid");
            continue;
        };

        match DecodingKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(kid, key);
            }
            Err(err) => {
                tracing::warn!(kid = %kid, error = %err, "skipping unusable signing key");
            }
        }
    }

    if keys.is_empty() {
        return Err(KeySourceError::InvalidKeySet("no usable keys".to_string()));
    }

    Ok(keys)
}

/// Parse `max-age` out of a `Cache-Control` header.
fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .find_map(|directive| {
            directive
                .trim()
                .strip_prefix("max-age=")?
                .trim()
                .parse::<u64>()
                .ok()
        })
        .map(Duration::from_secs)
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    expires_at: Instant,
}

enum Lookup {
    Found(DecodingKey),
    // cache is fresh but has no such kid
    Missing,
    // nothing cached yet, or past max-age
    Stale,
}

fn lookup(cache: &Option<CachedKeys>, kid: &str, now: Instant) -> Lookup {
    let Some(cached) = cache else {
        return Lookup::Stale;
    };

    if now >= cached.expires_at {
        return Lookup::Stale;
    }

    match cached.keys.get(kid) {
        Some(key) => Lookup::Found(key.clone()),
        None => Lookup::Missing,
    }
}

/// Whether an unknown kid may trigger a refresh, given when the last
/// refresh was attempted (successful or not).
fn forced_refresh_due(last_attempt: Option<Instant>, now: Instant) -> bool {
    last_attempt.is_none_or(|at| now.saturating_duration_since(at) >= MIN_FORCED_REFRESH_INTERVAL)
}

/// JWK set fetched over HTTPS and cached in-process.
///
/// No retries and no client-side timeout: a failed fetch surfaces as
/// `KeySourceError` for the request that triggered it.
///
/// At most one fetch runs at a time (`refresh`). Lookups only take the
/// `cache` read lock, so cached kids keep verifying while a fetch is in flight.
pub struct GoogleKeySource {
    http: reqwest::Client,
    url: Url,
    cache: RwLock<Option<CachedKeys>>,
    // start of the last fetch attempt
    refresh: Mutex<Option<Instant>>,
}

impl GoogleKeySource {
    pub fn new(url: Url) -> Result<Self, KeySourceError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self::with_client(url, http))
    }

    pub fn with_client(url: Url, http: reqwest::Client) -> Self {
        Self {
            http,
            url,
            cache: RwLock::new(None),
            refresh: Mutex::new(None),
        }
    }

    async fn lookup(&self, kid: &str) -> Lookup {
        lookup(&*self.cache.read().await, kid, Instant::now())
    }

    async fn fetch(&self) -> Result<CachedKeys, KeySourceError> {
        let res = self.http.get(self.url.clone()).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(KeySourceError::Status(status));
        }

        let max_age = max_age(res.headers()).unwrap_or(DEFAULT_MAX_AGE);
        let body = res.bytes().await?;

        let set: JwkSet = serde_json::from_slice(&body)
            .map_err(|e| KeySourceError::InvalidKeySet(e.to_string()))?;
        let keys = decoding_keys(&set)?;

        tracing::debug!(
            keys = keys.len(),
            max_age_secs = max_age.as_secs(),
            "signing keys refreshed"
        );

        Ok(CachedKeys {
            keys,
            expires_at: Instant::now() + max_age,
        })
    }
}

impl std::fmt::Debug for GoogleKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleKeySource")
            .field("url", &self.url.as_str())
            .finish()
    }
}

#[async_trait]
impl KeySource for GoogleKeySource {
    async fn decoding_key(&self, kid: &str) -> Result<Option<DecodingKey>, KeySourceError> {
        if let Lookup::Found(key) = self.lookup(kid).await {
            return Ok(Some(key));
        }

        let mut last_attempt = self.refresh.lock().await;

        // Re-check: the fetch we may have waited for could have answered this.
        let now = Instant::now();
        match self.lookup(kid).await {
            Lookup::Found(key) => return Ok(Some(key)),
            Lookup::Missing if !forced_refresh_due(*last_attempt, now) => return Ok(None),
            Lookup::Missing | Lookup::Stale => {}
        }

        // Recorded before fetching so a failure still counts against the limit.
        *last_attempt = Some(now);

        let fresh = self.fetch().await?;
        let key = fresh.keys.get(kid).cloned();
        *self.cache.write().await = Some(fresh);

        Ok(key)
    }
}
