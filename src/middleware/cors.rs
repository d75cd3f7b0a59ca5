//! CORS policy for the intake form running in the browser.
//!
//! Policy:
//! - Development: Allow-Origin `*`, no credentials.
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`; an empty list allows none.
//!
//! The bearer token travels in `Authorization`, so that header must be allowed.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppEnv;
use crate::middleware::http::REQUEST_ID_HEADER;

pub fn apply(router: Router, app_env: AppEnv, allowed_origins: &[String]) -> Router {
    router.layer(layer(app_env, allowed_origins))
}

fn layer(app_env: AppEnv, allowed_origins: &[String]) -> CorsLayer {
    let cors = if app_env.is_production() {
        let allowed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin),
        ))
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10))
}
