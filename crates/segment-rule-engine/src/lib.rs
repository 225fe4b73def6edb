//! 商品分群规则引擎
//!
//! 将人工编写的文本规则（如 `price > 10`）解析为结构化比较，并以 AND 语义
//! 过滤内存中的商品集合：
//! - 规则解析：`field operator value` 三段式，无法识别的规则永不匹配
//! - 条件评估：按 (比较类型, 操作符) 查表分派，所有比较函数均为全函数
//! - 分群执行：空规则返回原集合，空商品返回空集合

pub mod error;
pub mod evaluator;
pub mod executor;
pub mod models;
pub mod operators;
pub mod parser;

pub use error::{Result, RuleError};
pub use evaluator::{ComparisonKind, ConditionEvaluator};
pub use executor::SegmentEvaluator;
pub use models::{FieldValue, ParsedRule, Product, RuleField, SegmentResult};
pub use operators::Operator;
pub use parser::RuleParser;
