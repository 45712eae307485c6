//! Benchmarks for adaptive quadrature, box cubature and L-BFGS.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use quadmin::{
    CubatureOptions, GaussKronrodRule, GradientFn, LbfgsOptions, QuadOptions, integrate,
    integrate_box, minimize,
};

fn bench_rule_orders(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_semi_infinite");
    let f = |x: f64| 1.0 / ((x + 1.0) * x.sqrt());

    for rule in GaussKronrodRule::ALL {
        let options = QuadOptions::default().rule_order(rule.points());
        group.bench_with_input(BenchmarkId::new("gk", rule.points()), &options, |b, opts| {
            b.iter(|| black_box(integrate(f, 0.0, f64::INFINITY, opts)))
        });
    }

    group.finish();
}

fn bench_oscillatory(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_oscillatory");

    for freq in [10.0, 100.0, 1000.0] {
        let f = move |x: f64| (freq * x).sin() * (-x).exp();
        let options = QuadOptions::default().max_subdivisions(1000);
        group.bench_with_input(BenchmarkId::new("sin_exp", freq as u64), &options, |b, opts| {
            b.iter(|| black_box(integrate(f, 0.0, 10.0, opts)))
        });
    }

    group.finish();
}

fn bench_box(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate_box");

    for dim in [2usize, 4, 8] {
        let lower = vec![0.0; dim];
        let upper = vec![1.0; dim];
        let options = CubatureOptions::with_max_evals(20_000).tolerances(1e-4, 1e-4);
        let f = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>().sqrt();
        group.bench_with_input(BenchmarkId::new("halton", dim), &dim, |b, _| {
            b.iter(|| black_box(integrate_box(f, &lower, &upper, &options)))
        });
    }

    group.finish();
}

fn bench_lbfgs(c: &mut Criterion) {
    let mut group = c.benchmark_group("lbfgs_rosenbrock");

    // Extended Rosenbrock in n dimensions
    let rosenbrock = GradientFn(|x: &[f64], g: &mut [f64]| {
        let n = x.len();
        let mut f = 0.0;
        g.iter_mut().for_each(|gi| *gi = 0.0);
        for i in 0..n - 1 {
            let t = x[i + 1] - x[i] * x[i];
            f += (1.0 - x[i]).powi(2) + 100.0 * t * t;
            g[i] += -2.0 * (1.0 - x[i]) - 400.0 * x[i] * t;
            g[i + 1] += 200.0 * t;
        }
        f
    });

    for n in [2usize, 10, 100] {
        let x0: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { -1.2 } else { 1.0 }).collect();
        for m in [3usize, 10] {
            let options = LbfgsOptions::default().history(m).max_iter(2000);
            group.bench_with_input(BenchmarkId::new(format!("m{}", m), n), &x0, |b, x0| {
                b.iter(|| black_box(minimize(rosenbrock, x0, &options)))
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rule_orders,
    bench_oscillatory,
    bench_box,
    bench_lbfgs
);
criterion_main!(benches);
