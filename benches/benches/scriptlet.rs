//! Benchmark template compilation and rendering time.

use criterion::{criterion_group, criterion_main, Criterion};
use scriptlet::{Engine, Options};

use benches::context;

criterion_main! { benches }
criterion_group! { benches, bench_compile, bench_render }

/// Benchmarks the time taken to compile a template.
fn bench_compile(c: &mut Criterion) {
    let mut g = c.benchmark_group("compile");
    let source = benches::page(150);

    g.bench_function("function_source", |b| {
        let options = Options::default();
        b.iter(|| scriptlet::compile(&source, &options).unwrap());
    });

    g.bench_function("engine", |b| {
        let mut engine = Engine::new();
        b.iter(|| engine.add_template("bench", &source).unwrap());
    });
}

/// Benchmarks the time taken to render a template as a string.
fn bench_render(c: &mut Criterion) {
    let mut g = c.benchmark_group("render");
    let source = benches::page(150);
    let ctx = context::random(150);

    for debug in [true, false] {
        let name = if debug { "debug" } else { "no_debug" };
        g.bench_function(name, |b| {
            let options = Options::builder().compile_debug(debug).build();
            let mut engine = Engine::with_options(options);
            engine.add_template("bench", &source).unwrap();
            b.iter(|| engine.render("page", &ctx).unwrap());
        });
    }
}
