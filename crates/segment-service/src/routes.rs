//! 路由配置模块

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// 构建全部 API 路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/segments/evaluate", post(handlers::evaluate_segment))
        .route("/products", get(handlers::list_products))
        .route("/catalog/refresh", post(handlers::refresh_catalog))
        .route("/health", get(handlers::health))
}

/// 绑定状态后的应用路由
pub fn app(state: AppState) -> Router {
    api_routes().with_state(state)
}
