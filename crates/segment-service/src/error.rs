//! 分群服务 API 错误类型
//!
//! 所有错误统一渲染为 `{success: false, code, error}`，上游细节只进日志。

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use segment_shared::error::SegmentError;
use serde_json::json;

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 请求体不是 `{"rules": [string]}`
    #[error("Invalid request format")]
    InvalidRequest { details: String },

    /// 分群评估过程中拉取目录失败
    #[error("Failed to evaluate segment rules")]
    Evaluation(#[source] SegmentError),

    /// 读取或刷新商品目录失败
    #[error("Failed to fetch products")]
    Catalog(#[source] SegmentError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Evaluation(_) | Self::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::Evaluation(e) | Self::Catalog(e) => e.code(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            details: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::InvalidRequest { details } => {
                tracing::warn!(details = %details, "请求体校验失败");
                json!({
                    "success": false,
                    "code": self.error_code(),
                    "error": self.to_string(),
                    "details": details,
                })
            }
            Self::Evaluation(e) | Self::Catalog(e) => {
                tracing::error!(code = e.code(), error = %e, "{}", self);
                json!({
                    "success": false,
                    "code": self.error_code(),
                    "error": self.to_string(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
