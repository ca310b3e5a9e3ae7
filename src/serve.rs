//! Purpose: Provide the HTTP/JSON server for the stocklet catalog.
//! Exports: `ServeConfig`, `serve`, `init_tracing`.
//! Role: Axum-based loopback server implementing the v0 product endpoint.
//! Invariants: Success bodies match `api::message`; error bodies are a flat {"error": string}.
//! Invariants: Binds loopback by default; anything else requires the explicit opt-in flag.
//! Notes: Request-body problems map to 400 so clients always see the flat error shape.

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use stocklet::api::{Catalog, Error, ErrorBody, ErrorKind, ProductBody};

const VERSION_HEADER: &str = "stocklet-version";
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub bind: SocketAddr,
    pub catalog_dir: PathBuf,
    pub allow_non_loopback: bool,
    pub cors_origins: Vec<String>,
    pub max_body_bytes: u64,
}

struct AppState {
    catalog: Catalog,
}

pub async fn serve(config: ServeConfig) -> Result<(), Error> {
    validate_config(&config)?;

    init_tracing();

    let body_limit: usize = config.max_body_bytes.try_into().map_err(|_| {
        Error::new(ErrorKind::Usage).with_message("--max-body-bytes exceeds the addressable limit")
    })?;

    let catalog = Catalog::open(&config.catalog_dir)?;
    let state = Arc::new(AppState { catalog });

    let mut app = Router::new()
        .route("/healthz", get(health))
        .route("/v0/products", post(create_product))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    if let Some(cors) = cors_layer(&config.cors_origins)? {
        app = app.layer(cors);
    }
    // Outermost so fallback 404s, 405s, and preflight responses carry the header.
    let app = app.layer(map_response(stamp_version));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to bind listen address")
                .with_source(err)
        })?;
    tracing::info!(
        bind = %config.bind,
        dir = %config.catalog_dir.display(),
        "catalog server ready"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = stop_rx.await;
        })
        .into_future();
    tokio::pin!(server);

    let finished = tokio::select! {
        result = &mut server => Some(result),
        _ = wait_for_signal() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            // Signal received: ask axum to stop accepting, then drain with a deadline.
            let _ = stop_tx.send(());
            tokio::time::timeout(DRAIN_TIMEOUT, &mut server)
                .await
                .map_err(|_| {
                    Error::new(ErrorKind::Io).with_message("timed out draining connections")
                })?
        }
    };
    result.map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("http server error")
            .with_source(err)
    })
}

fn is_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => v6.is_loopback(),
    }
}

fn validate_config(config: &ServeConfig) -> Result<(), Error> {
    if !is_loopback(config.bind.ip()) && !config.allow_non_loopback {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("refusing non-loopback bind without --allow-non-loopback")
            .with_hint("Bind to 127.0.0.1, or pass --allow-non-loopback to expose the server."));
    }

    if config.max_body_bytes == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--max-body-bytes must be at least 1")
            .with_hint("The default is 1048576 (1 MiB)."));
    }

    cors_layer(&config.cors_origins)?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>, Error> {
    if origins.is_empty() {
        return Ok(None);
    }
    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        let value: HeaderValue = origin.parse().map_err(|_| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid cors origin: {origin}"))
                .with_hint("Use a full origin like https://app.example.com.")
        })?;
        allowed.push(value);
    }
    let layer = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    Ok(Some(layer))
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    // stderr keeps stdout clean for command output when serve runs under the CLI.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn wait_for_signal() {
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("install SIGTERM handler");
        sigterm.recv().await;
    };
    #[cfg(unix)]
    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    interrupt.await;
}

async fn health() -> Response {
    json_response(json!({"ok": true}))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(
                Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid request body: {}", rejection.body_text())),
            );
        }
    };
    let name = match payload.get("name") {
        Some(Value::String(name)) => name,
        Some(_) => {
            return error_response(
                Error::new(ErrorKind::Usage).with_message("name must be a string"),
            );
        }
        None => {
            return error_response(Error::new(ErrorKind::Usage).with_message("name is required"));
        }
    };
    match state.catalog.create_product(name) {
        Ok(product) => json_response(ProductBody::from(&product)),
        Err(err) => error_response(err),
    }
}

fn json_response<T: serde::Serialize>(payload: T) -> Response {
    Json(payload).into_response()
}

fn error_response(err: Error) -> Response {
    let status = match err.kind() {
        ErrorKind::Usage => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Busy => StatusCode::LOCKED,
        ErrorKind::Permission => StatusCode::FORBIDDEN,
        ErrorKind::Corrupt | ErrorKind::Io | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let body = ErrorBody {
        error: err.message().unwrap_or("internal error").to_string(),
    };
    (status, Json(body)).into_response()
}

async fn stamp_version(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(VERSION_HEADER, HeaderValue::from_static("0"));
    response
}
