//! 统一错误处理模块
//!
//! 定义基础设施层共享的错误类型，使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum SegmentError {
    // ==================== 商品目录错误 ====================
    #[error("商品目录服务不可用: {0}")]
    CatalogUnavailable(String),

    #[error("商品目录服务返回错误状态: {0}")]
    CatalogStatus(u16),

    #[error("商品目录服务拒绝请求")]
    CatalogRejected,

    #[error("商品目录响应解析失败: {0}")]
    CatalogDecode(String),

    #[error("商品目录请求超时: {service}")]
    CatalogTimeout { service: String },

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SegmentError>;

impl SegmentError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable(_) => "CATALOG_UNAVAILABLE",
            Self::CatalogStatus(_) => "CATALOG_STATUS_ERROR",
            Self::CatalogRejected => "CATALOG_REJECTED",
            Self::CatalogDecode(_) => "CATALOG_DECODE_ERROR",
            Self::CatalogTimeout { .. } => "CATALOG_TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 网络不可达、超时和 5xx 视为瞬时故障；4xx 与响应格式错误重试也无济于事。
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::CatalogUnavailable(_) | Self::CatalogTimeout { .. } => true,
            Self::CatalogStatus(status) => *status >= 500,
            _ => false,
        }
    }
}
