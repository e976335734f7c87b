//! Benchmarks for profile evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finite_games::games::kuhn::{equilibrium, kuhn_poker};
use finite_games::{Game, MixedStrategyProfile, PayoffArray, Rational};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn random_table(size: usize) -> Game {
    let arrays = (0..2)
        .map(|pl| {
            let data = (0..size * size).map(|i| ((i * 7 + pl * 3) % 11) as i64).collect();
            PayoffArray::from_vec(vec![size, size], data).unwrap()
        })
        .collect();
    Game::from_arrays(arrays).unwrap()
}

fn table_liap_benchmark(c: &mut Criterion) {
    let game = random_table(10);
    let mut rng = StdRng::seed_from_u64(42);
    let profile = MixedStrategyProfile::<f64>::random(&game, &mut rng).unwrap();

    c.bench_function("table_10x10_liap", |b| {
        b.iter(|| black_box(profile.liap_value().unwrap()))
    });
}

fn kuhn_behavior_benchmark(c: &mut Criterion) {
    let game = kuhn_poker().unwrap();
    let profile = equilibrium(&game, 1.0 / 6.0).unwrap();

    c.bench_function("kuhn_behavior_liap", |b| {
        b.iter(|| black_box(profile.liap_value().unwrap()))
    });
    c.bench_function("kuhn_as_strategy", |b| {
        b.iter(|| black_box(profile.as_strategy().unwrap()))
    });
}

fn kuhn_exact_benchmark(c: &mut Criterion) {
    let game = kuhn_poker().unwrap();
    let alpha = Rational::new(1.into(), 6.into());
    let profile = equilibrium(&game, alpha).unwrap();
    let player = game.player(0).unwrap();

    c.bench_function("kuhn_exact_payoff", |b| {
        b.iter(|| black_box(profile.payoff(&player).unwrap()))
    });
}

criterion_group!(
    benches,
    table_liap_benchmark,
    kuhn_behavior_benchmark,
    kuhn_exact_benchmark
);
criterion_main!(benches);
