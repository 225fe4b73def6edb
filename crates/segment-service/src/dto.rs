//! 请求与响应 DTO

use rule_engine::Product;
use serde::{Deserialize, Serialize};

/// 分群评估请求
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateSegmentRequest {
    pub rules: Vec<String>,
}

/// 分群评估响应
///
/// 目录为空时携带 `message` 而不带 `count`。
#[derive(Debug, Serialize)]
pub struct EvaluateSegmentResponse {
    pub success: bool,
    pub data: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub rules_applied: Vec<String>,
}

impl EvaluateSegmentResponse {
    /// 正常结果，`count` 为参与评估的目录商品总数
    pub fn matched(data: Vec<Product>, total: usize, rules_applied: Vec<String>) -> Self {
        Self {
            success: true,
            data,
            count: Some(total),
            message: None,
            rules_applied,
        }
    }

    pub fn empty_catalog(rules_applied: Vec<String>) -> Self {
        Self {
            success: true,
            data: Vec::new(),
            count: None,
            message: Some("No products found".to_string()),
            rules_applied,
        }
    }
}

/// 商品列表响应，同时也是商品服务 `/products` 的响应格式
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Product>,
    #[serde(default)]
    pub count: usize,
}

impl ProductListResponse {
    pub fn new(data: Vec<Product>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// 手动刷新目录响应
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub count: usize,
}
