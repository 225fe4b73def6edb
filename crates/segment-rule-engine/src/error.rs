//! 规则引擎错误类型
//!
//! 宽松解析（[`crate::RuleParser::parse`]）从不返回错误；这里的错误只用于
//! 严格校验和诊断输出，说明某条规则为什么永远不会匹配。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("规则为空")]
    EmptyRule,

    #[error("规则格式错误: '{line}' 需要 `field operator value` 三段，实际 {found} 段")]
    MissingToken { line: String, found: usize },

    #[error("不支持的字段: {0}")]
    UnknownField(String),

    #[error("不支持的操作符: {operator} 不适用于 {kind} 比较")]
    UnsupportedOperator { operator: String, kind: String },

    #[error("有序比较 {operator} 只适用于数值: {field} 的值 '{value}' 按文本比较")]
    OrderingOnText {
        operator: String,
        field: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, RuleError>;
