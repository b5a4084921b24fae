//! HTTP surface.
//!
//! The service owns the sticky session (a `lang` cookie) and feeds request
//! signals to the resolver. Handlers take one catalog snapshot per request.

use crate::config::Config;
use crate::i18n::{
    is_recent, parse_accept_language, CatalogStore, LocaleSource, LookupMetrics, MetricsReport,
    RequestSignals, SessionWrite, SupportedLocales, SESSION_LOCALE_KEY,
};
use crate::security::{check_admin_key, AdminAccess};
use anyhow::{Context, Result};
use axum::extract::{Query, Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Items newer than this many days are flagged as new.
const NEW_ITEM_DAYS: u32 = 7;

pub const API_KEY_HEADER: &str = "x-api-key";

// ==================== Errors ====================

/// Errors a handler can return. Renders as `{"code": ..., "message": ...}`.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed request input. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or wrong admin key. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Endpoint is switched off. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_FAILED",
            ServiceError::Unauthorized(_) => "UNAUTHENTICATED",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

// ==================== State & Router ====================

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<CatalogStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/render", get(render))
        .route("/metrics", get(metrics))
        .route("/admin/reload", post(admin_reload))
        .layer(middleware::from_fn_with_state(state.clone(), auto_reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load catalogs from the configured directory and serve on `config.port`.
pub async fn serve(config: Config) -> Result<()> {
    let store = Arc::new(CatalogStore::open(config.catalog_source()));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve_on(listener, AppState::new(store, config)).await
}

/// Serve on an already-bound listener.
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

async fn auto_reload(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.config.auto_reload_on_each_request {
        let store = Arc::clone(&state.store);
        if let Err(e) = tokio::task::spawn_blocking(move || store.reload_if_changed()).await {
            warn!("Catalog change check failed: {}", e);
        }
    }
    next.run(request).await
}

// ==================== Handlers ====================

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    pub lang: Option<String>,
    pub count: Option<String>,
    pub since: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub locale: String,
    pub source: LocaleSource,
    pub products: String,
    pub time_ago: String,
    pub is_new: bool,
    pub store_status: String,
    pub action: String,
}

async fn render(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
    headers: HeaderMap,
) -> Result<Response, ServiceError> {
    let since = query
        .since
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ServiceError::Validation(format!("invalid 'since' timestamp: {}", e)))
        })
        .transpose()?;
    let count = match query.count.as_deref() {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ServiceError::Validation(format!("invalid 'count' {:?}: {}", raw, e)))?,
        None => 0,
    };

    let catalogs = state.store.snapshot();
    let signals = request_signals(query.lang, &headers, catalogs.supported());
    let resolution = catalogs.resolver().resolve(&signals);
    let t = catalogs.translator(&resolution.locale);
    let now = Utc::now();

    let body = RenderResponse {
        locale: resolution.locale.clone(),
        source: resolution.source,
        products: t.format_product_count(count),
        time_ago: t.time_ago(since, now),
        is_new: is_recent(since, now, NEW_ITEM_DAYS),
        store_status: t.lookup("store_status", "open"),
        action: t.lookup("action", "open"),
    };

    let mut response = Json(body).into_response();
    if let Some(write) = resolution.session_write {
        let cookie = session_cookie(&write)?;
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    Ok(response)
}

async fn metrics() -> Json<MetricsReport> {
    Json(LookupMetrics::global().report())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub locales: Vec<String>,
}

async fn admin_reload(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReloadResponse>, ServiceError> {
    let presented = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    match check_admin_key(state.config.admin_api_key.as_deref(), presented) {
        AdminAccess::Granted => {}
        AdminAccess::Denied => {
            warn!("Rejected catalog reload with invalid API key");
            return Err(ServiceError::Unauthorized("invalid API key".into()));
        }
        AdminAccess::Disabled => {
            return Err(ServiceError::NotFound("admin endpoints are disabled".into()));
        }
    }

    let store = Arc::clone(&state.store);
    let set = tokio::task::spawn_blocking(move || store.reload())
        .await
        .map_err(|e| ServiceError::Internal(format!("reload task failed: {}", e)))?;

    Ok(Json(ReloadResponse {
        locales: set.supported().iter().map(str::to_string).collect(),
    }))
}

// ==================== Request Signals ====================

/// Collect resolution inputs from the query override, the session cookie and
/// the `Accept-Language` header.
///
/// The `lang` cookie is unsigned and client-controlled, so its value only
/// counts when it names a supported locale; anything else is treated as no
/// session at all.
pub fn request_signals(
    override_param: Option<String>,
    headers: &HeaderMap,
    supported: &SupportedLocales,
) -> RequestSignals {
    let session_locale = cookie_value(headers, SESSION_LOCALE_KEY).and_then(|stored| {
        let canonical = supported.canonical(&stored).map(str::to_string);
        if canonical.is_none() {
            debug!("Ignoring unsupported session cookie locale: {:?}", stored);
        }
        canonical
    });

    RequestSignals {
        override_param,
        session_locale,
        accepted_languages: headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(parse_accept_language)
            .unwrap_or_default(),
    }
}

/// Value of cookie `name` from the `Cookie` headers, if present.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

fn session_cookie(write: &SessionWrite) -> Result<HeaderValue, ServiceError> {
    HeaderValue::from_str(&format!("{}={}; Path=/; SameSite=Lax", write.key, write.value))
        .map_err(|e| ServiceError::Internal(format!("invalid session cookie: {}", e)))
}
