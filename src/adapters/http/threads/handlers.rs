//! HTTP handlers for thread endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{PipelineError, RunCoordinator};
use crate::domain::foundation::ThreadId;

use super::dto::{
    ErrorResponse, HealthResponse, RunResponse, SendMessageRequest, ThreadResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ThreadHandlers {
    coordinator: Arc<RunCoordinator>,
}

impl ThreadHandlers {
    pub fn new(coordinator: Arc<RunCoordinator>) -> Self {
        Self { coordinator }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /threads/:thread_id/messages - Start a thread or answer its question
pub async fn send_message(
    State(handlers): State<ThreadHandlers>,
    Path(thread_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .coordinator
        .advance(&thread_id, Some(&req.content))
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(RunResponse::from(outcome))).into_response(),
        Err(e) => handle_pipeline_error(e),
    }
}

/// POST /threads/:thread_id/resume - Continue a run from its last checkpoint
pub async fn resume_thread(
    State(handlers): State<ThreadHandlers>,
    Path(thread_id): Path<String>,
) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.coordinator.resume(&thread_id).await {
        Ok(outcome) => (StatusCode::OK, Json(RunResponse::from(outcome))).into_response(),
        Err(e) => handle_pipeline_error(e),
    }
}

/// GET /threads/:thread_id - Latest checkpoint with transcript
pub async fn get_thread(
    State(handlers): State<ThreadHandlers>,
    Path(thread_id): Path<String>,
) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.coordinator.state(&thread_id).await {
        Ok(state) => (StatusCode::OK, Json(ThreadResponse::from(state))).into_response(),
        Err(e) => handle_pipeline_error(e),
    }
}

/// DELETE /threads/:thread_id - Forget a thread
pub async fn delete_thread(
    State(handlers): State<ThreadHandlers>,
    Path(thread_id): Path<String>,
) -> Response {
    let thread_id = match parse_thread_id(&thread_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.coordinator.delete(&thread_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_pipeline_error(e),
    }
}

/// GET /health - Liveness probe
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn parse_thread_id(raw: &str) -> Result<ThreadId, Response> {
    raw.parse::<ThreadId>().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(format!("Invalid thread id: {}", e))),
        )
            .into_response()
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_pipeline_error(error: PipelineError) -> Response {
    let status = match &error {
        PipelineError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PipelineError::Model(_) => StatusCode::BAD_GATEWAY,
        PipelineError::SchemaValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::ThreadNotFound(_) => StatusCode::NOT_FOUND,
        PipelineError::RunFinished(_) | PipelineError::InputNotExpected { .. } => {
            StatusCode::CONFLICT
        }
        PipelineError::EmptyInput => StatusCode::BAD_REQUEST,
        PipelineError::CheckpointCorrupt { .. }
        | PipelineError::Storage(_)
        | PipelineError::InvalidState(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(code = error.code(), error = %error, "Request failed");
    } else {
        tracing::debug!(code = error.code(), error = %error, "Request rejected");
    }

    let mut body = ErrorResponse::new(error.code(), error.to_string());
    if let PipelineError::InputNotExpected { node, .. } = &error {
        body = body.with_details(serde_json::json!({ "next_node": node.as_str() }));
    }
    (status, Json(body)).into_response()
}
