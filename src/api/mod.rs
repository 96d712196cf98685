pub mod handlers;

pub use handlers::*;

use axum::{
    routing::{get, post},
    Router,
};

/// 纯引擎路由 (无需数据库)
pub fn engine_routes(state: EngineState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/engine/indent/parse", post(parse_indent))
        .route("/api/engine/quote/parse", post(parse_quote))
        .route("/api/engine/comparison", post(compare))
        .with_state(state)
}

/// 存储流程路由
pub fn workflow_routes(state: WorkflowState) -> Router {
    Router::new()
        .route("/api/indents/:id/lines", post(add_indent_lines))
        .route("/api/indents/:id/comparison", get(indent_comparison))
        .route("/api/indents/:id/comparison/export", post(export_indent_comparison))
        .route("/api/indent-lines/:id/normalize", post(normalize_indent_line))
        .route("/api/rfqs/:id/quotes", post(submit_quote))
        .route("/api/rfqs/:id/send", post(send_rfq))
        .with_state(state)
}
