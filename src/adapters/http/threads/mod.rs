//! HTTP adapter for thread endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AnalysisResponse, ErrorResponse, HealthResponse, NodeMessageResponse, RunResponse,
    SendMessageRequest, ThreadResponse,
};
pub use handlers::ThreadHandlers;
pub use routes::thread_routes;
