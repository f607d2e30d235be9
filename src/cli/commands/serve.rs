//! HTTP API server.
//!
//! `POST /run` runs the research pipeline, `POST /assist` the calculator/weather
//! assistant.

use crate::api::{AssistRequest, ErrorResponse, RunRequest, RunResponse, FALLBACK_HEADER};
use crate::assistant::Assistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    pub pipeline: Pipeline,
    pub assistant: Option<Assistant>,
}

/// Build the router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/run", post(run))
        .route("/assist", post(assist))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let credentials = match preflight::credentials(Operation::Research, &settings) {
        Ok(credentials) => credentials,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'quill doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    };

    let pipeline = Pipeline::from_settings(&settings, &credentials)?;
    let assistant = match Assistant::from_settings(&settings, &credentials) {
        Ok(assistant) => Some(assistant),
        Err(e) => {
            warn!("Assistant disabled: {}", e);
            None
        }
    };
    let assistant_enabled = assistant.is_some();

    let state = Arc::new(AppState {
        pipeline,
        assistant,
    });
    let app = router(state);

    let host = host.unwrap_or(settings.server.host);
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Quill API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Research", "POST /run");
    if assistant_enabled {
        Output::kv("Assistant", "POST /assist");
    } else {
        Output::kv("Assistant", "POST /assist (disabled, weather key not set)");
    }
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn run(State(state): State<Arc<AppState>>, Json(req): Json<RunRequest>) -> Response {
    let request_id = Uuid::new_v4();
    info!(%request_id, "Research request received");

    match state.pipeline.run(&req.query).await {
        Ok(output) => {
            let fallback = output.outcome.failure().map(|f| f.kind);
            let mut response = Json(RunResponse::from(output)).into_response();
            if let Some(kind) = fallback {
                warn!(%request_id, %kind, "Responding with research fallback");
                response
                    .headers_mut()
                    .insert(FALLBACK_HEADER, HeaderValue::from_static(kind.as_str()));
            }
            response
        }
        Err(e) => {
            error!(%request_id, "Pipeline failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn assist(State(state): State<Arc<AppState>>, Json(req): Json<AssistRequest>) -> Response {
    let Some(assistant) = state.assistant.as_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Assistant is not configured".to_string(),
        );
    };

    match assistant.assist(&req.input).await {
        Ok(output) => Json(output).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
