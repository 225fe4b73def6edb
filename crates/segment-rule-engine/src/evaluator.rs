//! 条件评估器
//!
//! 单条规则对单个商品的判定。比较逻辑集中在 (比较类型, 操作符) 分派表中，
//! 新增字段或操作符只需修改表项；表中没有的组合一律判为不匹配。
//! 所有函数都是全函数，不会 panic 也不会返回错误。

use crate::error::{Result, RuleError};
use crate::models::{ParsedRule, Product};
use crate::operators::Operator;
use std::fmt;

/// 比较类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    /// 数值字段且字面量可解析为数字
    Numeric,
    /// 其余情况：双方转为文本后比较
    Textual,
}

impl ComparisonKind {
    pub fn of(rule: &ParsedRule) -> Self {
        if rule.is_numeric && rule.field.is_numeric_typed() {
            Self::Numeric
        } else {
            Self::Textual
        }
    }
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Textual => write!(f, "text"),
        }
    }
}

/// 比较函数：左侧为商品值，右侧为规则字面量
#[derive(Clone, Copy)]
enum Comparator {
    Numeric(fn(f64, f64) -> bool),
    Textual(fn(&str, &str) -> bool),
}

fn num_eq(a: f64, b: f64) -> bool {
    a == b
}

fn num_neq(a: f64, b: f64) -> bool {
    a != b
}

fn num_gt(a: f64, b: f64) -> bool {
    a > b
}

fn num_gte(a: f64, b: f64) -> bool {
    a >= b
}

fn num_lt(a: f64, b: f64) -> bool {
    a < b
}

fn num_lte(a: f64, b: f64) -> bool {
    a <= b
}

fn text_eq(a: &str, b: &str) -> bool {
    a == b
}

fn text_neq(a: &str, b: &str) -> bool {
    a != b
}

/// 操作符分派表
const DISPATCH_TABLE: &[(ComparisonKind, Operator, Comparator)] = &[
    (ComparisonKind::Numeric, Operator::Eq, Comparator::Numeric(num_eq)),
    (ComparisonKind::Numeric, Operator::Neq, Comparator::Numeric(num_neq)),
    (ComparisonKind::Numeric, Operator::Gt, Comparator::Numeric(num_gt)),
    (ComparisonKind::Numeric, Operator::Gte, Comparator::Numeric(num_gte)),
    (ComparisonKind::Numeric, Operator::Lt, Comparator::Numeric(num_lt)),
    (ComparisonKind::Numeric, Operator::Lte, Comparator::Numeric(num_lte)),
    (ComparisonKind::Textual, Operator::Eq, Comparator::Textual(text_eq)),
    (ComparisonKind::Textual, Operator::Neq, Comparator::Textual(text_neq)),
];

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估单条规则是否对商品成立
    pub fn evaluate(rule: &ParsedRule, product: &Product) -> bool {
        if !rule.valid {
            return false;
        }

        let Some(value) = product.field_value(rule.field) else {
            return false;
        };

        let kind = ComparisonKind::of(rule);
        match Self::lookup(kind, &rule.operator) {
            Some(Comparator::Numeric(cmp)) => match value.as_number() {
                Some(actual) => cmp(actual, rule.numeric_value),
                // 数值缺失时任何操作符都不匹配
                None => false,
            },
            Some(Comparator::Textual(cmp)) => cmp(&value.to_text(), &rule.raw_value),
            None => false,
        }
    }

    /// 判断 (比较类型, 操作符) 组合是否受支持
    pub fn supports(kind: ComparisonKind, operator: &Operator) -> bool {
        Self::lookup(kind, operator).is_some()
    }

    /// 检查一条已解析规则的操作符是否可用
    pub fn check(rule: &ParsedRule) -> Result<()> {
        let kind = ComparisonKind::of(rule);
        if Self::supports(kind, &rule.operator) {
            return Ok(());
        }

        if kind == ComparisonKind::Textual && rule.operator.is_ordering() {
            return Err(RuleError::OrderingOnText {
                operator: rule.operator.to_string(),
                field: rule.field.to_string(),
                value: rule.raw_value.clone(),
            });
        }

        Err(RuleError::UnsupportedOperator {
            operator: rule.operator.to_string(),
            kind: kind.to_string(),
        })
    }

    fn lookup(kind: ComparisonKind, operator: &Operator) -> Option<Comparator> {
        DISPATCH_TABLE
            .iter()
            .find(|(k, op, _)| *k == kind && op == operator)
            .map(|(_, _, cmp)| *cmp)
    }
}
