//! HTTP 处理器

use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rule_engine::SegmentEvaluator;
use segment_shared::observability::metrics;
use tracing::{Level, debug, info, instrument};

use crate::dto::{
    EvaluateSegmentRequest, EvaluateSegmentResponse, HealthResponse, ProductListResponse,
    RefreshResponse,
};
use crate::error::{ApiError, Result};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "segment-service";

/// 按规则列表筛选商品
///
/// POST /segments/evaluate
#[instrument(skip(state, payload))]
pub async fn evaluate_segment(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EvaluateSegmentRequest>, JsonRejection>,
) -> Result<Json<EvaluateSegmentResponse>> {
    let Json(req) = payload?;

    info!(rules = req.rules.len(), "收到分群评估请求");
    for (i, rule) in req.rules.iter().enumerate() {
        info!(index = i, rule = %rule, "分群规则");
    }

    let products = state
        .catalog
        .fetch_products()
        .await
        .map_err(ApiError::Evaluation)?;

    if products.is_empty() {
        return Ok(Json(EvaluateSegmentResponse::empty_catalog(req.rules)));
    }

    let evaluator = if tracing::enabled!(Level::DEBUG) {
        SegmentEvaluator::new().with_trace()
    } else {
        SegmentEvaluator::new()
    };

    let start = Instant::now();
    let result = evaluator.evaluate_detailed(&products, &req.rules[..]);
    metrics::record_segment_evaluation(
        req.rules.len(),
        result.matched,
        start.elapsed().as_secs_f64(),
    );

    for line in &result.evaluation_trace {
        debug!("{}", line);
    }
    info!(
        total = result.total,
        matched = result.matched,
        "分群评估完成"
    );

    Ok(Json(EvaluateSegmentResponse::matched(
        result.products,
        result.total,
        req.rules,
    )))
}

/// 当前目录
///
/// GET /products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<ProductListResponse>> {
    let products = state
        .catalog
        .fetch_products()
        .await
        .map_err(ApiError::Catalog)?;

    Ok(Json(ProductListResponse::new(products)))
}

/// 立即刷新目录缓存；未启用缓存时直接拉取上游并返回数量
///
/// POST /catalog/refresh
#[instrument(skip(state))]
pub async fn refresh_catalog(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    let count = match &state.cache {
        Some(cache) => cache.refresh().await,
        None => state.catalog.fetch_products().await.map(|p| p.len()),
    }
    .map_err(ApiError::Catalog)?;

    info!(count, "手动刷新商品目录");

    Ok(Json(RefreshResponse {
        status: "ok",
        service: "refreshed products",
        count,
    }))
}

/// 存活探针
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
    })
}
