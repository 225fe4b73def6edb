//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 描述服务暴露的指标，出现在 /metrics 的 HELP 注释中
fn describe_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "segment_evaluations_total",
        "Total number of segment evaluations"
    );
    metrics::describe_histogram!(
        "segment_evaluation_duration_seconds",
        "Segment evaluation duration in seconds"
    );
    metrics::describe_histogram!(
        "segment_matched_products",
        "Number of products matched per segment evaluation"
    );

    metrics::describe_counter!(
        "catalog_refreshes_total",
        "Total number of product catalog refreshes"
    );
    metrics::describe_gauge!("catalog_products", "Products in the cached catalog snapshot");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录一次分群评估
///
/// `rules` 按条数分桶打标签，避免把规则原文写进标签导致基数爆炸。
#[inline]
pub fn record_segment_evaluation(rules: usize, matched: usize, duration_secs: f64) {
    let bucket = match rules {
        0 => "0",
        1 => "1",
        2..=4 => "2-4",
        _ => "5+",
    };

    metrics::counter!("segment_evaluations_total", "rules" => bucket).increment(1);
    metrics::histogram!("segment_evaluation_duration_seconds").record(duration_secs);
    metrics::histogram!("segment_matched_products").record(matched as f64);
}

/// 记录一次目录刷新，`status` 取 "success" 或 "failure"
#[inline]
pub fn record_catalog_refresh(status: &str) {
    metrics::counter!("catalog_refreshes_total", "status" => status.to_string()).increment(1);
}

/// 更新缓存目录中的商品数
#[inline]
pub fn set_catalog_products(count: usize) {
    metrics::gauge!("catalog_products").set(count as f64);
}
