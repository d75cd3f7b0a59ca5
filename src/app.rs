/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (service account, JWK source, verifier) → Router 組み立て
 * - Middleware の適用 (gate / security headers / CORS / HTTP 共通)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::batch::batch, v1::handlers::health};
use crate::config::Config;
use crate::middleware::{self, auth::ProtectedRoutes};
use crate::services::identity::{FirebaseVerifier, GoogleKeySource, ServiceAccount};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,incoming_goods=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()
        .inspect_err(|err| tracing::error!(error = %err, "refusing to start"))?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let account = ServiceAccount::new(
        &config.firebase_project_id,
        &config.firebase_client_email,
        &config.firebase_private_key_pem,
    )
    .inspect_err(|err| tracing::error!(error = %err, "firebase service account rejected"))?;

    tracing::info!(
        project_id = %account.project_id(),
        client_email = %account.client_email(),
        "firebase credential loaded"
    );

    let keys = Arc::new(GoogleKeySource::new(config.firebase_jwks_url.clone())?);
    let verifier = FirebaseVerifier::new(&account, keys, config.id_token_leeway_seconds);

    Ok(AppState::new(
        Arc::new(verifier),
        ProtectedRoutes::new(&config.protected_path_prefixes),
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api/v1", api::v1::routes())
        .route("/batch", get(batch))
        .with_state(state.clone());

    // Later layers wrap earlier ones: CORS answers preflights before the gate,
    // and gate rejections still get security headers and a request id.
    let router = middleware::auth::gate::apply(router, state);
    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config.app_env, &config.cors_allowed_origins);
    middleware::http::apply(router)
}
