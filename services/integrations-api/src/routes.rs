//! HTTP routes for the HubSpot integration

use axum::extract::rejection::QueryRejection;
use axum::extract::{MatchedPath, Query, Request, State};
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hubspot_auth::{CallbackParams, HubspotOAuth};
use hubspot_items::IntegrationItem;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Instrument, info, info_span, warn};

use crate::error::ApiError;
use crate::form::FormFields;
use crate::metrics::{self as service_metrics, ServiceMetrics, observe};

/// Shared application state accessible from all handlers
#[derive(Clone)]
pub struct AppState {
    pub oauth: HubspotOAuth,
    pub http_client: reqwest::Client,
    pub api_base_url: String,
    pub store_backend: String,
    pub metrics: ServiceMetrics,
    pub prometheus: PrometheusHandle,
}

/// Build the axum router with all routes and shared state.
///
/// Requests beyond `max_connections` in flight are queued by the
/// concurrency limit layer.
pub fn build_router(state: AppState, max_connections: usize, cors: CorsLayer) -> Router {
    Router::new()
        .route("/integrations/hubspot/authorize", post(authorize_handler))
        .route(
            "/integrations/hubspot/oauth2callback",
            get(callback_handler),
        )
        .route(
            "/integrations/hubspot/credentials",
            post(credentials_handler),
        )
        .route("/integrations/hubspot/load", post(load_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_request))
        .layer(cors)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

/// CORS policy for the configured origins. `"*"` allows any origin without credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed).allow_credentials(true)
}

/// Tag each request with an id, run it inside a span and record metrics.
async fn track_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let start = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = start.elapsed();
    let status = response.status();

    state.metrics.requests_total.fetch_add(1, Ordering::Relaxed);
    if status.is_client_error() || status.is_server_error() {
        state.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
    }
    service_metrics::record_request(&route, status.as_u16(), elapsed.as_secs_f64());

    span.in_scope(|| {
        info!(
            status = status.as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

async fn authorize_handler(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<Json<String>, ApiError> {
    let user_id = fields.required("user_id")?;
    let org_id = fields.required("org_id")?;
    let url = observe(
        "authorize",
        state.oauth.begin_authorization(user_id, org_id).await,
    )?;
    Ok(Json(url))
}

/// Malformed query strings are answered like any other callback failure.
async fn callback_handler(
    State(state): State<AppState>,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Html<&'static str>, ApiError> {
    let result = match query {
        Ok(Query(params)) => {
            let html = state.oauth.handle_callback(params).await;
            html.map_err(ApiError::from)
        }
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    };
    let html = observe("callback", result)?;
    Ok(Html(html))
}

async fn credentials_handler(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<Json<Value>, ApiError> {
    let user_id = fields.required("user_id")?;
    let org_id = fields.required("org_id")?;
    let blob = observe(
        "credentials",
        state.oauth.fetch_credentials(user_id, org_id).await,
    )?;
    Ok(Json(blob))
}

async fn load_handler(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<Json<Vec<IntegrationItem>>, ApiError> {
    let credentials = Value::String(fields.required("credentials")?.to_owned());
    let client = &state.http_client;
    let result = hubspot_items::list_items(client, &state.api_base_url, &credentials).await;
    let items = observe("load", result)?;
    Ok(Json(items))
}

/// Liveness plus process counters.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.metrics;
    let body = serde_json::json!({
        "status": "healthy",
        "store": state.store_backend,
        "uptime_seconds": metrics.started_at.elapsed().as_secs(),
        "requests_served": metrics.requests_total.load(Ordering::Relaxed),
        "errors_total": metrics.errors_total.load(Ordering::Relaxed),
    });
    (StatusCode::OK, Json(body))
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.prometheus.render(),
    )
}
