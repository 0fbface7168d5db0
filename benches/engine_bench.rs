use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use load_sim::engine::run_scenario;
use load_sim::models::{BalancingStrategy, Scenario, TrafficPattern};

const SERVERS: usize = 8;
const DURATION: f64 = 60.0;
const RATE: f64 = 100.0;

fn build_scenario(strategy: BalancingStrategy, pattern: TrafficPattern) -> Scenario {
    let mut scenario = Scenario::named("bench");
    scenario.duration = DURATION;
    scenario.num_servers = SERVERS;
    scenario.base_request_rate = RATE;
    scenario.traffic_pattern = pattern;
    scenario.balancing_strategy = strategy;
    scenario.request_processing_time = 1.0;
    scenario.random_seed = Some(42);
    scenario
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let size_label = format!("{}x{}", DURATION as u64, SERVERS);

    for strategy in BalancingStrategy::ALL {
        group.bench_with_input(
            BenchmarkId::new(strategy.to_string(), &size_label),
            &strategy,
            |b, strategy: &BalancingStrategy| {
                b.iter_batched(
                    || build_scenario(*strategy, TrafficPattern::Poisson),
                    |scenario| {
                        let result = run_scenario(&scenario).expect("simulation should succeed");
                        black_box(result);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("traffic");

    for pattern in TrafficPattern::ALL {
        group.bench_with_input(
            BenchmarkId::new(pattern.to_string(), RATE as u64),
            &pattern,
            |b, pattern: &TrafficPattern| {
                b.iter_batched(
                    || build_scenario(BalancingStrategy::RoundRobin, *pattern),
                    |scenario| {
                        let result = run_scenario(&scenario).expect("simulation should succeed");
                        black_box(result);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_strategies, bench_patterns);
criterion_main!(benches);
