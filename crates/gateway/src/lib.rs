//! HTTP gateway for Rentier.
//!
//! Exposes the advisor pipeline over REST: `POST /advisor` runs one query
//! and streams the answer back as plain-text chunks; `GET /health` is the
//! liveness probe for the dashboard.
//!
//! Built on Axum. The response body is wired directly to the pipeline's
//! bounded answer channel, so a slow client throttles the upstream
//! completion instead of buffering it.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use rentier_advisor::{AdvisorPipeline, KnowledgeBase};
use rentier_config::AppConfig;
use rentier_core::query::{AdvisorQuery, TransactionRecord};
use rentier_providers::OpenAiCompatProvider;

/// Shared application state for the gateway.
///
/// Everything here is read-only; one pipeline serves all requests.
pub struct GatewayState {
    pub pipeline: Arc<AdvisorPipeline>,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, cors_allow_any: bool) -> Router {
    let router = Router::new()
        .route("/advisor", post(advisor_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024));

    // The dashboard frontend is served from another origin in development,
    // so CORS defaults to permissive; same-origin deployments turn it off.
    let router = if cors_allow_any {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the provider client, property index, and knowledge base once and
/// shares them behind `Arc` across all requests.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() {
        warn!("No API key configured — advisor requests will fail until one is set");
    }

    let provider = Arc::new(OpenAiCompatProvider::from_config(&config));
    let index = rentier_store::build_from_config(&config)?;
    let knowledge = Arc::new(KnowledgeBase::load(&config)?);

    let pipeline = Arc::new(AdvisorPipeline::new(
        provider.clone(),
        provider,
        index,
        knowledge,
        &config,
    ));

    let state = Arc::new(GatewayState { pipeline });
    let app = build_router(state, config.gateway.cors_allow_any);

    info!(addr = %addr, store = %config.retrieval.store, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ── Handlers ──────────────────────────────────────────────────────────────

/// Request body for `POST /advisor`.
///
/// `question` defaults to empty when the key is missing, so the pipeline's
/// empty-question check is the single validation site for the 400 path.
#[derive(Deserialize)]
struct AdvisorRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /advisor` — run one query and stream the answer.
///
/// Success is `200 text/plain; charset=utf-8` with a chunked body. A
/// rejected question is `400`; any pipeline failure before streaming is
/// `500` with a JSON error. Once the body has started, a provider failure
/// simply ends the stream (the partial answer stands).
async fn advisor_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AdvisorRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let query = AdvisorQuery {
        question: payload.question,
        transactions: payload.transactions,
    };

    match state.pipeline.run(query).await {
        Ok(rx) => {
            let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                Body::from_stream(stream),
            )
                .into_response())
        }
        Err(e) if e.is_rejection() => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
        Err(e) => {
            error!(stage = e.stage(), error = %e, "Advisor pipeline failed before streaming");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
