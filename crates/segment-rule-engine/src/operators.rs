//! 规则操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 比较操作符
///
/// 操作符在解析阶段不做校验，未知符号保留原文，评估时一律不匹配。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Other(String),
}

impl Operator {
    /// 从规则中的原始符号解析
    pub fn from_token(token: &str) -> Self {
        match token {
            "=" => Self::Eq,
            "!=" => Self::Neq,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            other => Self::Other(other.to_string()),
        }
    }

    /// 规则文本中的符号
    pub fn symbol(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Other(raw) => raw,
        }
    }

    /// 是否为有序比较（仅数值路径支持）
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token_known_symbols() {
        assert_eq!(Operator::from_token("="), Operator::Eq);
        assert_eq!(Operator::from_token("!="), Operator::Neq);
        assert_eq!(Operator::from_token(">"), Operator::Gt);
        assert_eq!(Operator::from_token(">="), Operator::Gte);
        assert_eq!(Operator::from_token("<"), Operator::Lt);
        assert_eq!(Operator::from_token("<="), Operator::Lte);
    }

    #[test]
    fn test_unknown_symbol_keeps_raw_token() {
        let op = Operator::from_token("==");
        assert_eq!(op, Operator::Other("==".to_string()));
        assert_eq!(op.to_string(), "==");
        assert!(!op.is_ordering());
    }
}
