use crate::{
    api::handlers::{
        auth::{self, AuthConfig, AuthState},
        health, users,
    },
    store::{memory::MemoryStore, postgres::PgStore},
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};
use ulid::Ulid;
use url::Url;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

/// Where users and sessions are kept.
#[derive(Debug)]
pub enum Backend {
    Postgres { dsn: String },
    Memory,
}

/// Build the application router: auth endpoints and the gated users listing,
/// with session resolution applied to them, plus `/health`, which never
/// consults the session store.
pub fn router(auth_state: Arc<AuthState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register::register))
        .route("/login", post(auth::login::login))
        .route("/logout", get(auth::logout::logout));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route_layer(middleware::from_fn(auth::require_session));

    let session_routes = Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth::resolve_session,
        ));

    Router::new()
        .route("/health", get(health::health).options(health::health))
        .merge(session_routes)
        .layer(Extension(auth_state))
}

/// Start the server
/// # Errors
/// Return error if failed to connect to the store or to start the server
pub async fn new(
    port: u16,
    backend: Backend,
    auth_config: AuthConfig,
    cors_origin: Option<String>,
) -> Result<()> {
    let auth_state = Arc::new(connect(backend, auth_config).await?);

    let app = router(auth_state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span)),
    );

    let app = match cors_origin {
        Some(origin) => app.layer(cors_layer(&origin)?),
        None => app,
    };

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn connect(backend: Backend, auth_config: AuthConfig) -> Result<AuthState> {
    match backend {
        Backend::Postgres { dsn } => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(&dsn)
                .await
                .context("Failed to connect to database")?;
            let store = Arc::new(PgStore::new(pool));
            Ok(AuthState::new(auth_config, store.clone(), store))
        }
        Backend::Memory => {
            warn!("No DSN configured, users and sessions are kept in memory");
            let store = Arc::new(MemoryStore::new());
            Ok(AuthState::new(auth_config, store.clone(), store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(cors_origin(origin)?))
        .allow_credentials(true))
}

fn cors_origin(origin: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(origin).with_context(|| format!("Invalid CORS origin: {origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build CORS origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origin_drops_path_and_keeps_port() -> Result<()> {
        let origin = cors_origin("https://app.example.com:8443/login?next=/")?;
        assert_eq!(origin, "https://app.example.com:8443");
        let origin = cors_origin("http://localhost/")?;
        assert_eq!(origin, "http://localhost");
        Ok(())
    }

    #[test]
    fn cors_origin_rejects_invalid_urls() {
        assert!(cors_origin("not a url").is_err());
    }
}
