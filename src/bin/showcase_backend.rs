#![forbid(unsafe_code)]

//! Axum JSON backend in front of one showcase session.
//!
//! The public routes only ever see redacted snapshots. The settings routes
//! return the full record, API key included, and therefore sit behind the
//! shared admin secret carried in the `x-showcase-secret` header.

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use showcase_tools::config::{
    DeploymentMode, RuntimeConfig, RuntimeOverrides, resolve_runtime_config,
};
use showcase_tools::controller::FeedSnapshot;
use showcase_tools::logging::init_tracing;
use showcase_tools::models::Settings;
use showcase_tools::security::{AdminGate, INCORRECT_SECRET_MESSAGE, ensure_not_root};
use showcase_tools::session::Session;
use showcase_tools::settings::SettingsError;
use tokio::signal;
use tracing::{error, info, warn};

const SECRET_HEADER: &str = "x-showcase-secret";

#[derive(Debug, Clone, Default)]
struct BackendArgs {
    overrides: RuntimeOverrides,
}

impl BackendArgs {
    fn parse() -> Result<Self> {
        Self::from_iter(std::env::args().skip(1))
    }

    fn from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut overrides = RuntimeOverrides::default();
        let mut args = iter.into_iter();
        while let Some(arg) = args.next() {
            // Accept both `--flag=value` and `--flag value`.
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = || {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| anyhow!("{flag} requires a value"))
            };
            match flag.as_str() {
                "--env-file" => overrides.env_path = Some(PathBuf::from(value()?)),
                "--settings" => overrides.settings_path = Some(PathBuf::from(value()?)),
                "--sheet-url" => overrides.sheet_url = Some(value()?),
                "--mode" => overrides.mode = Some(DeploymentMode::parse(&value()?)?),
                "--host" => overrides.host = Some(parse_host_arg(&value()?)?.to_string()),
                "--port" => overrides.port = Some(parse_port_arg(&value()?)?),
                _ => return Err(anyhow!("unknown argument: {arg}")),
            }
        }
        Ok(Self { overrides })
    }
}

fn parse_port_arg(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .context("expected a numeric port between 0 and 65535")
}

fn parse_host_arg(value: &str) -> Result<IpAddr> {
    value
        .parse::<IpAddr>()
        .context("expected a valid IPv4 or IPv6 address for --host/SHOWCASE_HOST")
}

/// Result of bringing the session up. A sheet deployment whose document
/// cannot be fetched stays in `Failed` for the life of the process.
enum Startup {
    Ready(Session),
    Failed(String),
}

#[derive(Clone)]
struct AppState {
    startup: Arc<Startup>,
    gate: Arc<AdminGate>,
}

impl AppState {
    async fn start(config: &RuntimeConfig) -> Self {
        let startup = match Session::from_config(config).await {
            Ok(session) => Startup::Ready(session),
            Err(err) => {
                let message = format!("{err:#}");
                error!(error = %message, mode = config.mode.as_str(), "showcase failed to start");
                Startup::Failed(message)
            }
        };
        Self::new(startup, AdminGate::new(config.admin_secret.as_deref()))
    }

    fn new(startup: Startup, gate: AdminGate) -> Self {
        Self {
            startup: Arc::new(startup),
            gate: Arc::new(gate),
        }
    }

    fn session(&self) -> ApiResult<&Session> {
        match self.startup.as_ref() {
            Startup::Ready(session) => Ok(session),
            Startup::Failed(message) => Err(ApiError::unavailable(message.clone())),
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> ApiResult<()> {
        let candidate = headers
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if self.gate.check(candidate) {
            Ok(())
        } else {
            Err(ApiError::unauthorized(INCORRECT_SECRET_MESSAGE))
        }
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Startup never completed; every session route answers with this.
    fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct LoginRequest {
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoreVideosResponse {
    loaded: bool,
    showcase: FeedSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedSettings {
    settings: Settings,
    persisted: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");
    let BackendArgs { overrides } = BackendArgs::parse()?;

    ensure_not_root("showcase_backend")?;

    let config = resolve_runtime_config(overrides)?;
    let host = parse_host_arg(&config.host)?;
    if config.admin_secret.is_none() {
        warn!("SHOWCASE_ADMIN_SECRET is not set; admin routes are disabled");
    }

    let state = AppState::start(&config).await;
    let app = router(state);

    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    info!(%addr, mode = config.mode.as_str(), "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running API server")?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/showcase", get(show_showcase))
        .route("/api/videos/more", post(load_more_videos))
        .route("/api/refresh", post(refresh_showcase))
        .route("/api/login", post(login))
        .route("/api/settings", get(get_settings).put(update_settings))
        .fallback(not_found)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(%err, "failed to install Ctrl+C handler");
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("endpoint not found")
}

async fn show_showcase(
    State(state): State<AppState>,
) -> ApiResult<Json<FeedSnapshot>> {
    Ok(Json(state.session()?.snapshot().redacted()))
}

async fn load_more_videos(
    State(state): State<AppState>,
) -> ApiResult<Json<MoreVideosResponse>> {
    let session = state.session()?;
    let loaded = session.load_more().await;
    Ok(Json(MoreVideosResponse {
        loaded,
        showcase: session.snapshot().redacted(),
    }))
}

async fn refresh_showcase(
    State(state): State<AppState>,
) -> ApiResult<Json<FeedSnapshot>> {
    let session = state.session()?;
    session.refresh().await;
    Ok(Json(session.snapshot().redacted()))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<StatusCode> {
    if state.gate.check(&payload.password) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::unauthorized(INCORRECT_SECRET_MESSAGE))
    }
}

async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Settings>> {
    state.authorize(&headers)?;
    Ok(Json(state.session()?.settings()))
}

async fn update_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Settings>,
) -> ApiResult<Json<SavedSettings>> {
    state.authorize(&headers)?;
    let session = state.session()?;
    let persisted = match session.save_settings(payload).await {
        Ok(()) => true,
        // The session already runs on the new settings; only the file is stale.
        Err(SettingsError::Persistence(err)) => {
            warn!(error = %err, "settings applied but not persisted");
            false
        }
        Err(SettingsError::ReadOnly) => {
            return Err(ApiError::conflict(SettingsError::ReadOnly.to_string()));
        }
        Err(SettingsError::Invalid(message)) => return Err(ApiError::bad_request(message)),
    };
    Ok(Json(SavedSettings {
        settings: session.settings(),
        persisted,
    }))
}
