//! 规则引擎领域模型

use crate::operators::Operator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// 商品记录
///
/// 由上游商品目录产出，规则引擎只读不写。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub stock_status: String,
    pub stock_quantity: Option<i64>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub on_sale: bool,
    /// 上游未提供时为空，不会被补成当前时间
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// 读取规则字段对应的商品值，`Invalid` 字段没有值
    pub fn field_value(&self, field: RuleField) -> Option<FieldValue<'_>> {
        let value = match field {
            RuleField::Price => FieldValue::Number(Some(self.price)),
            RuleField::StockQuantity => FieldValue::Number(self.stock_quantity.map(|q| q as f64)),
            RuleField::OnSale => FieldValue::Bool(self.on_sale),
            RuleField::StockStatus => FieldValue::Text(&self.stock_status),
            RuleField::Category => FieldValue::Text(&self.category),
            RuleField::Tags => FieldValue::List(&self.tags),
            RuleField::Title => FieldValue::Text(&self.title),
            RuleField::Invalid => return None,
        };
        Some(value)
    }
}

/// 规则可引用的字段
///
/// 字段名大小写敏感，不在白名单中的字段统一归为 `Invalid`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    Price,
    StockQuantity,
    OnSale,
    StockStatus,
    Category,
    Tags,
    Title,
    Invalid,
}

impl RuleField {
    /// 允许使用的字段白名单
    pub const ALLOWED: [RuleField; 7] = [
        Self::Price,
        Self::StockQuantity,
        Self::OnSale,
        Self::StockStatus,
        Self::Category,
        Self::Tags,
        Self::Title,
    ];

    pub fn from_name(name: &str) -> Self {
        Self::ALLOWED
            .into_iter()
            .find(|field| field.as_str() == name)
            .unwrap_or(Self::Invalid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::StockQuantity => "stock_quantity",
            Self::OnSale => "on_sale",
            Self::StockStatus => "stock_status",
            Self::Category => "category",
            Self::Tags => "tags",
            Self::Title => "title",
            Self::Invalid => "invalid",
        }
    }

    /// 是否为数值类型字段（只有这些字段会走数值比较）
    pub fn is_numeric_typed(&self) -> bool {
        matches!(self, Self::Price | Self::StockQuantity)
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 商品字段值的借用视图
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// 数值字段，`None` 表示商品未提供该值
    Number(Option<f64>),
    Text(&'a str),
    Bool(bool),
    List(&'a [String]),
}

impl FieldValue<'_> {
    /// 数值视图，缺失值和非数值字段均返回 `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => *n,
            _ => None,
        }
    }

    /// 文本强制转换
    ///
    /// 列表以逗号拼接，布尔值为 `true`/`false`，缺失的数值为 `null`。
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(None) => Cow::Borrowed("null"),
            Self::Number(Some(n)) => Cow::Owned(format_number(*n)),
            Self::Text(s) => Cow::Borrowed(s),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::List(items) => Cow::Owned(items.join(",")),
        }
    }
}

/// 数值转文本，与 ECMAScript `Number::toString` 的输出保持一致
///
/// 整数不带小数点，绝对值 ≥ 1e21 或 < 1e-6 时使用指数形式（正指数带 `+`）。
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // -0 同样输出 "0"
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let exp = format!("{:e}", n);
        return match exp.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => exp,
        };
    }

    format!("{}", n)
}

/// 解析后的单条规则
///
/// 每次评估时由一行规则文本构造，过滤结束即丢弃。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRule {
    pub field: RuleField,
    pub operator: Operator,
    pub raw_value: String,
    /// 字段是否在白名单中
    pub valid: bool,
    /// 字段为数值类型且字面量可解析为数字
    pub is_numeric: bool,
    /// 字面量的数值解析结果，可能为 NaN；仅在 `is_numeric` 为真时使用
    pub numeric_value: f64,
}

impl ParsedRule {
    /// 构造永不匹配的规则
    pub fn invalid(operator: Operator, raw_value: impl Into<String>) -> Self {
        Self {
            field: RuleField::Invalid,
            operator,
            raw_value: raw_value.into(),
            valid: false,
            is_numeric: false,
            numeric_value: f64::NAN,
        }
    }
}

impl fmt::Display for ParsedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.raw_value)
    }
}

/// 分群评估结果（带追踪信息）
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResult {
    pub products: Vec<Product>,
    /// 命中商品数
    pub matched: usize,
    /// 参与评估的商品总数
    pub total: usize,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_ms: i64,
}

impl SegmentResult {
    pub fn new(total: usize) -> Self {
        Self {
            products: Vec::new(),
            matched: 0,
            total,
            evaluation_trace: Vec::new(),
            evaluation_time_ms: 0,
        }
    }
}
