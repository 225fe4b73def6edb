//! 规则解析器
//!
//! 把一行 `field operator value` 文本解析成 [`ParsedRule`]。值中不能包含空白，
//! 第三段之后的内容会被丢弃；格式错误的规则降级为永不匹配，不会报错。

use crate::error::{Result, RuleError};
use crate::models::{ParsedRule, RuleField};
use crate::operators::Operator;

/// 规则解析器
pub struct RuleParser;

impl RuleParser {
    /// 宽松解析：任何输入都会得到一条规则，无法识别的规则 `valid = false`
    pub fn parse(line: &str) -> ParsedRule {
        let mut tokens = line.split_whitespace();
        let (Some(field), Some(operator), Some(value)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            let mut tokens = line.split_whitespace().skip(1);
            let operator = Operator::from_token(tokens.next().unwrap_or_default());
            return ParsedRule::invalid(operator, tokens.next().unwrap_or_default());
        };

        let operator = Operator::from_token(operator);
        let field = RuleField::from_name(field);
        if field == RuleField::Invalid {
            return ParsedRule::invalid(operator, value);
        }

        let numeric_value = parse_number(value);

        ParsedRule {
            field,
            operator,
            raw_value: value.to_string(),
            valid: true,
            is_numeric: field.is_numeric_typed() && !numeric_value.is_nan(),
            numeric_value,
        }
    }

    /// 按顺序解析多行规则
    pub fn parse_all<S: AsRef<str>>(lines: &[S]) -> Vec<ParsedRule> {
        lines.iter().map(|line| Self::parse(line.as_ref())).collect()
    }

    /// 严格校验：说明规则为什么无法匹配
    pub fn validate(line: &str) -> Result<ParsedRule> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if tokens.is_empty() {
            return Err(RuleError::EmptyRule);
        }

        if tokens.len() < 3 {
            return Err(RuleError::MissingToken {
                line: line.trim().to_string(),
                found: tokens.len(),
            });
        }

        if RuleField::from_name(tokens[0]) == RuleField::Invalid {
            return Err(RuleError::UnknownField(tokens[0].to_string()));
        }

        Ok(Self::parse(line))
    }
}

/// 按 ECMAScript `Number(text)` 的规则把字面量转换为数值
///
/// 空串为 0；支持 `0x`/`0o`/`0b` 前缀与 `Infinity`；其余不合法的文本为 NaN。
pub fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(value) = parse_prefixed_integer(s) {
        return value;
    }

    if is_decimal_literal(s) {
        return s.parse().unwrap_or(f64::NAN);
    }

    f64::NAN
}

/// `0x1F` / `0o17` / `0b101`，不允许带符号
fn parse_prefixed_integer(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }

    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };

    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }

    let mut value = 0.0_f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => value = value * radix as f64 + d as f64,
            None => return Some(f64::NAN),
        }
    }
    Some(value)
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let mut chars = s.chars().peekable();

    if matches!(chars.peek(), Some('+') | Some('-')) {
        chars.next();
    }

    let mut mantissa_digits = 0;
    while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
        chars.next();
        mantissa_digits += 1;
    }

    if chars.peek() == Some(&'.') {
        chars.next();
        while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            chars.next();
            mantissa_digits += 1;
        }
    }

    if mantissa_digits == 0 {
        return false;
    }

    if matches!(chars.peek(), Some('e') | Some('E')) {
        chars.next();
        if matches!(chars.peek(), Some('+') | Some('-')) {
            chars.next();
        }
        let mut exponent_digits = 0;
        while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            chars.next();
            exponent_digits += 1;
        }
        if exponent_digits == 0 {
            return false;
        }
    }

    chars.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_rule() {
        let rule = RuleParser::parse("price > 10");

        assert!(rule.valid);
        assert!(rule.is_numeric);
        assert_eq!(rule.field, RuleField::Price);
        assert_eq!(rule.operator, Operator::Gt);
        assert_eq!(rule.raw_value, "10");
        assert_eq!(rule.numeric_value, 10.0);
    }

    #[test]
    fn test_parse_text_rule() {
        let rule = RuleParser::parse("category = Accessories");

        assert!(rule.valid);
        assert!(!rule.is_numeric);
        assert_eq!(rule.field, RuleField::Category);
        assert_eq!(rule.raw_value, "Accessories");
        assert!(rule.numeric_value.is_nan());
    }

    #[test]
    fn test_numeric_literal_on_text_field_is_not_numeric() {
        let rule = RuleParser::parse("title = 42");

        assert!(rule.valid);
        assert!(!rule.is_numeric);
        // 数值解析照常进行，只是不会被使用
        assert_eq!(rule.numeric_value, 42.0);
    }

    #[test]
    fn test_non_numeric_literal_on_numeric_field() {
        let rule = RuleParser::parse("price = cheap");

        assert!(rule.valid);
        assert!(!rule.is_numeric);
        assert!(rule.numeric_value.is_nan());
    }

    #[test]
    fn test_unknown_field_is_invalid() {
        let rule = RuleParser::parse("weight > 5");

        assert!(!rule.valid);
        assert_eq!(rule.field, RuleField::Invalid);
        assert_eq!(rule.operator, Operator::Gt);
        assert_eq!(rule.raw_value, "5");
    }

    #[test]
    fn test_field_match_is_case_sensitive() {
        assert!(!RuleParser::parse("Price > 5").valid);
    }

    #[test]
    fn test_missing_tokens_are_invalid() {
        for line in ["price", "price >", "", "   "] {
            let rule = RuleParser::parse(line);
            assert!(!rule.valid, "'{}' should be invalid", line);
            assert_eq!(rule.field, RuleField::Invalid);
        }
    }

    #[test]
    fn test_extra_tokens_are_dropped() {
        let rule = RuleParser::parse("category = Gift Cards");

        assert!(rule.valid);
        assert_eq!(rule.raw_value, "Gift");
    }

    #[test]
    fn test_surrounding_and_repeated_whitespace() {
        let rule = RuleParser::parse("  stock_quantity   <=\t3  ");

        assert!(rule.valid);
        assert!(rule.is_numeric);
        assert_eq!(rule.operator, Operator::Lte);
        assert_eq!(rule.numeric_value, 3.0);
    }

    #[test]
    fn test_unknown_operator_is_kept() {
        let rule = RuleParser::parse("price ~ 10");

        assert!(rule.valid);
        assert_eq!(rule.operator, Operator::Other("~".to_string()));
    }

    #[test]
    fn test_parse_all_keeps_order() {
        let rules = RuleParser::parse_all(&["price > 1", "weight = 2", "on_sale = true"]);

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].field, RuleField::Price);
        assert_eq!(rules[1].field, RuleField::Invalid);
        assert_eq!(rules[2].field, RuleField::OnSale);
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(RuleParser::validate(" "), Err(RuleError::EmptyRule));
        assert_eq!(
            RuleParser::validate("price"),
            Err(RuleError::MissingToken {
                line: "price".to_string(),
                found: 1
            })
        );
        assert_eq!(
            RuleParser::validate("weight > 5"),
            Err(RuleError::UnknownField("weight".to_string()))
        );
        assert!(RuleParser::validate("price > 5").is_ok());
    }

    #[test]
    fn test_parse_number_decimal_forms() {
        assert_eq!(parse_number("10"), 10.0);
        assert_eq!(parse_number("-2.5"), -2.5);
        assert_eq!(parse_number("+3"), 3.0);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("5."), 5.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("2E-2"), 0.02);
        assert_eq!(parse_number(""), 0.0);
    }

    #[test]
    fn test_parse_number_special_forms() {
        assert_eq!(parse_number("0x1F"), 31.0);
        assert_eq!(parse_number("0o17"), 15.0);
        assert_eq!(parse_number("0b101"), 5.0);
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_parse_number_rejects_non_numbers() {
        for text in ["abc", "10abc", "inf", "nan", "infinity", "0x", "-0x10", "1e", ".", "1.2.3"] {
            assert!(parse_number(text).is_nan(), "'{}' should be NaN", text);
        }
    }
}
