//! Routing Operations Benchmarks
//!
//! Benchmarks for routing lookups, URL path matching and selector scripts.
//!
//! Run with: `cargo bench --bench routing_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heofon::apps::sweetshop;
use heofon::prelude::*;

fn bench_routing_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing_lookup");
    let app = sweetshop::application(Tier::Stage).unwrap();

    let cases = [
        ("noauth_hit", AuthMode::NoAuth, sweetshop::SWEETS_PAGE, false),
        ("crossing_hit", AuthMode::NoAuth, sweetshop::ACCOUNT_PAGE, true),
        ("miss", AuthMode::Auth, "sweetshop checkout page", false),
    ];

    for (name, mode, id, cross) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &id, |bench, id| {
            bench.iter(|| {
                let found = app.routing().lookup(mode, black_box(id), cross).is_ok();
                black_box(found);
            });
        });
    }

    group.finish();
}

fn bench_url_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("url_matching");

    let cases = [
        ("exact", "/sweets", "https://sweetshop.vivrichards.co.uk/sweets"),
        ("parameter", "/orders/:id", "https://shop.test/orders/1234?tab=items"),
        ("wildcard", "/account/*", "https://shop.test/account/settings"),
    ];

    for (name, pattern, url) in cases {
        let matcher = UrlMatcher::new(pattern);
        group.bench_with_input(BenchmarkId::from_parameter(name), &url, |bench, url| {
            bench.iter(|| black_box(matcher.matches_url(black_box(url))));
        });
    }

    group.finish();
}

fn bench_selector_scripts(c: &mut Criterion) {
    let selectors = [
        Selector::css("nav a.navbar-brand"),
        Selector::css_with_text("nav a", "Sweets"),
        Selector::test_id("login-submit"),
    ];

    c.bench_function("selector_click_scripts", |bench| {
        bench.iter(|| {
            for selector in &selectors {
                black_box(selector.to_click_script());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_routing_lookup,
    bench_url_matching,
    bench_selector_scripts
);
criterion_main!(benches);
