//! 商品分群服务
//!
//! 提供按规则筛选商品目录的 REST API。

use std::sync::Arc;

use axum::{http::HeaderValue, middleware};
use segment_service::{
    catalog::{self, CachedCatalog},
    routes,
    state::AppState,
    worker::CatalogRefreshWorker,
};
use segment_shared::{
    config::{AppConfig, CorsConfig},
    observability::{self, middleware as obs_middleware},
};
use tokio::{net::TcpListener, sync::watch};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "segment-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        source = ?config.catalog.source,
        base_url = %config.catalog.base_url,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let upstream = catalog::from_config(&config.catalog)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 刷新间隔为 0 时不缓存，每个请求直连上游
    let (state, worker_handle) = match config.catalog.refresh_interval() {
        Some(interval) => {
            let cache = Arc::new(CachedCatalog::new(upstream));
            let worker = CatalogRefreshWorker::new(cache.clone(), interval);
            let handle = tokio::spawn(worker.run(shutdown_rx));
            (AppState::cached(cache), Some(handle))
        }
        None => {
            info!("目录缓存已禁用，请求将直连上游");
            (AppState::direct(upstream), None)
        }
    };

    let app = routes::app(state)
        .layer(cors_layer(&config.cors, config.is_production()))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "刷新 Worker 异常退出");
        }
    }

    info!("Server shutdown complete");

    Ok(())
}

/// 未配置来源时放开所有来源
fn cors_layer(cors: &CorsConfig, production: bool) -> CorsLayer {
    if cors.allowed_origins.is_empty() || cors.allowed_origins.iter().any(|o| o == "*") {
        if production {
            warn!("生产环境 CORS 允许所有来源，请配置 cors.allowed_origins");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", cors.allowed_origins.join(","));
    let origins: Vec<_> = cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
