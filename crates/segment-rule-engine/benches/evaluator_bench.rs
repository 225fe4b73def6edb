//! 分群评估性能基准测试
//!
//! 针对规则解析、单条件评估和整批过滤进行性能测试。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_engine::{ConditionEvaluator, Product, RuleParser, SegmentEvaluator};
use std::hint::black_box;

/// 生成测试商品
fn create_catalog(size: usize) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            id: i as i64,
            title: format!("product-{}", i),
            price: (i % 200) as f64 + 0.99,
            stock_status: if i % 3 == 0 { "outofstock" } else { "instock" }.to_string(),
            stock_quantity: if i % 7 == 0 { None } else { Some((i % 50) as i64) },
            category: if i % 2 == 0 { "Accessories" } else { "Clothing" }.to_string(),
            tags: vec!["summer".to_string(), format!("batch-{}", i % 10)],
            on_sale: i % 4 == 0,
            created_at: None,
            updated_at: None,
        })
        .collect()
}

/// 规则解析基准
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("numeric", |b| b.iter(|| RuleParser::parse(black_box("price >= 10.5"))));
    group.bench_function("text", |b| {
        b.iter(|| RuleParser::parse(black_box("category = Accessories")))
    });
    group.bench_function("invalid", |b| b.iter(|| RuleParser::parse(black_box("weight > 5"))));

    group.finish();
}

/// 单条件评估基准
fn bench_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition");
    let catalog = create_catalog(1);
    let product = &catalog[0];

    for line in ["price > 10", "stock_quantity <= 3", "on_sale = true", "tags = summer,batch-0"] {
        let rule = RuleParser::parse(line);
        group.bench_with_input(BenchmarkId::from_parameter(line), &rule, |b, rule| {
            b.iter(|| ConditionEvaluator::evaluate(black_box(rule), black_box(product)))
        });
    }

    group.finish();
}

/// 整批过滤基准
fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");
    let rules = ["category = Accessories", "price < 100", "stock_status != outofstock"];
    let evaluator = SegmentEvaluator::new();

    for size in [100, 1_000, 10_000] {
        let catalog = create_catalog(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| evaluator.evaluate(black_box(catalog), black_box(&rules[..])))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_condition, bench_segment);
criterion_main!(benches);
