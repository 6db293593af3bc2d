//! 短码与 URL 工具性能基准测试

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use linkshepherd::utils::url_validator::normalize_url;
use linkshepherd::utils::{
    escape_html, generate_random_code, is_valid_custom_code, is_valid_short_code,
};

// ============== generate_random_code ==============

fn bench_generate_random_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/generate_random_code");

    for length in [6, 8, 12, 48] {
        group.bench_with_input(BenchmarkId::new("length", length), &length, |b, &length| {
            b.iter(|| {
                let code = generate_random_code(length);
                assert_eq!(code.len(), length);
            });
        });
    }

    group.finish();
}

// ============== 短码校验 ==============

fn bench_code_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/code_validation");

    group.bench_function("custom_valid", |b| {
        b.iter(|| {
            assert!(is_valid_custom_code("spring-sale-2024"));
        });
    });

    group.bench_function("custom_too_short", |b| {
        b.iter(|| {
            assert!(!is_valid_custom_code("ab"));
        });
    });

    group.bench_function("custom_bad_chars", |b| {
        b.iter(|| {
            assert!(!is_valid_custom_code("'; DROP TABLE--"));
        });
    });

    let max_len_code = "a".repeat(50);
    group.bench_function("short_max_length", |b| {
        b.iter(|| {
            assert!(is_valid_short_code(&max_len_code));
        });
    });

    group.finish();
}

// ============== normalize_url ==============

fn bench_normalize_url(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/normalize_url");

    group.bench_function("with_scheme", |b| {
        b.iter(|| {
            assert!(normalize_url("https://example.com/path?query=1").is_ok());
        });
    });

    group.bench_function("bare_host", |b| {
        b.iter(|| {
            assert!(normalize_url("example.com/docs").is_ok());
        });
    });

    group.bench_function("dangerous_protocol", |b| {
        b.iter(|| {
            assert!(normalize_url("javascript:alert(1)").is_err());
        });
    });

    group.finish();
}

fn bench_escape_html(c: &mut Criterion) {
    let title = "<b>Spring & \"Summer\" sale</b>".repeat(8);
    c.bench_function("utils/escape_html", |b| {
        b.iter(|| escape_html(&title));
    });
}

criterion_group!(
    benches,
    bench_generate_random_code,
    bench_code_validation,
    bench_normalize_url,
    bench_escape_html,
);
criterion_main!(benches);
