//! HTTP routes for thread endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    delete_thread, get_thread, health, resume_thread, send_message, ThreadHandlers,
};

/// Creates the thread router with all endpoints.
pub fn thread_routes(handlers: ThreadHandlers) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/threads/:thread_id", get(get_thread).delete(delete_thread))
        .route("/threads/:thread_id/messages", post(send_message))
        .route("/threads/:thread_id/resume", post(resume_thread))
        .with_state(handlers)
}
