//! 分群执行器
//!
//! 以 AND 语义组合多条规则，对商品集合做过滤。单条规则的解析与评估都是全函数；
//! [`SegmentEvaluator::try_evaluate`] 在入口处把永远无法匹配的规则报告为错误，
//! [`SegmentEvaluator::evaluate`] 将错误收敛为空结果。

use crate::error::Result;
use crate::evaluator::{ComparisonKind, ConditionEvaluator};
use crate::models::{ParsedRule, Product, SegmentResult};
use crate::parser::RuleParser;
use std::time::Instant;
use tracing::debug;

/// 分群执行器
#[derive(Debug, Clone, Copy)]
pub struct SegmentEvaluator {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl SegmentEvaluator {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 返回满足全部规则的商品
    ///
    /// 商品为空时返回空集合；规则为空时原样返回全部商品。
    /// 任何一条规则出错时返回空集合。
    pub fn evaluate<S: AsRef<str>>(&self, products: &[Product], rules: &[S]) -> Vec<Product> {
        self.try_evaluate(products, rules).unwrap_or_else(|e| {
            debug!(error = %e, "规则永不匹配，返回空结果");
            Vec::new()
        })
    }

    /// 严格评估：返回第一条永远无法匹配的规则的错误
    ///
    /// AND 组合下这样的规则必然使结果为空，因此 `Err` 与空结果等价。
    /// 商品为空时不检查规则，直接返回空集合。
    pub fn try_evaluate<S: AsRef<str>>(
        &self,
        products: &[Product],
        rules: &[S],
    ) -> Result<Vec<Product>> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        for line in rules {
            Self::diagnose(line.as_ref())?;
        }

        Ok(self.evaluate_detailed(products, rules).products)
    }

    /// 执行分群评估并返回统计与追踪信息
    pub fn evaluate_detailed<S: AsRef<str>>(
        &self,
        products: &[Product],
        rules: &[S],
    ) -> SegmentResult {
        let start = Instant::now();
        let mut result = SegmentResult::new(products.len());

        if products.is_empty() {
            return result;
        }

        if rules.is_empty() {
            result.products = products.to_vec();
            result.matched = products.len();
            result.evaluation_time_ms = start.elapsed().as_millis() as i64;
            return result;
        }

        let parsed = RuleParser::parse_all(rules);

        if self.trace_enabled {
            self.trace_rules(rules, &parsed, products, &mut result);
        }

        result.products = products
            .iter()
            .filter(|product| Self::matches_all(&parsed, product))
            .cloned()
            .collect();
        result.matched = result.products.len();
        result.evaluation_time_ms = start.elapsed().as_millis() as i64;

        debug!(
            rules = parsed.len(),
            total = result.total,
            matched = result.matched,
            "segment evaluated"
        );

        result
    }

    /// AND：遇到第一条不成立的规则立即返回
    fn matches_all(rules: &[ParsedRule], product: &Product) -> bool {
        rules
            .iter()
            .all(|rule| ConditionEvaluator::evaluate(rule, product))
    }

    /// 严格解析并检查操作符，说明规则为什么无法匹配
    fn diagnose(line: &str) -> Result<ParsedRule> {
        let rule = RuleParser::validate(line)?;
        ConditionEvaluator::check(&rule)?;
        Ok(rule)
    }

    fn trace_rules<S: AsRef<str>>(
        &self,
        lines: &[S],
        parsed: &[ParsedRule],
        products: &[Product],
        result: &mut SegmentResult,
    ) {
        for (i, (line, rule)) in lines.iter().zip(parsed).enumerate() {
            let line = line.as_ref().trim();

            match Self::diagnose(line) {
                Ok(rule) => {
                    let hits = products
                        .iter()
                        .filter(|product| ConditionEvaluator::evaluate(&rule, product))
                        .count();
                    result.evaluation_trace.push(format!(
                        "rules[{}]: {} => VALID ({}), 单独命中 {}/{}",
                        i,
                        rule,
                        ComparisonKind::of(&rule),
                        hits,
                        products.len()
                    ));
                }
                Err(e) => {
                    result.evaluation_trace.push(format!(
                        "rules[{}]: '{}' => NEVER_MATCHES ({}): {}",
                        i,
                        line,
                        if rule.valid { "valid" } else { "invalid" },
                        e
                    ));
                }
            }
        }
    }
}

impl Default for SegmentEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
