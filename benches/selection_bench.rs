use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use load_sim::algorithms::{build_strategy, SelectionContext};
use load_sim::events::{Event, Request};
use load_sim::hardware::{HardwareConfig, HardwareProfile, Language};
use load_sim::metrics::MetricsCollector;
use load_sim::models::BalancingStrategy;
use load_sim::scheduler::Scheduler;
use load_sim::server::{ProcessingModel, Server};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const SERVERS: usize = 8;
const ITERATIONS: usize = 1_000;

/// Servers carrying uneven load so score-based strategies have work to do.
fn build_servers(count: usize) -> Vec<Server> {
    let hardware = Arc::new(HardwareConfig::from_profile(HardwareProfile::Standard));
    let language = Arc::new(Language::Go.profile());
    let mut scheduler: Scheduler<Event> = Scheduler::new();
    let mut collector = MetricsCollector::default();
    let mut next_id = 0;

    (0..count)
        .map(|idx| {
            let mut server = Server::new(
                idx,
                Arc::clone(&hardware),
                Arc::clone(&language),
                30_000.0,
                ProcessingModel::default(),
                StdRng::seed_from_u64(idx as u64),
            );
            for _ in 0..(idx * 3) % 11 {
                server
                    .enqueue(Request::new(next_id, 0.0, 100.0), &mut scheduler, &mut collector)
                    .expect("enqueue should succeed");
                next_id += 1;
            }
            server
        })
        .collect()
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let size_label = format!("{}x{}", ITERATIONS, SERVERS);
    let weights: Vec<f64> = (1..=SERVERS).map(|w| w as f64).collect();
    let servers = build_servers(SERVERS);

    for strategy in BalancingStrategy::ALL {
        group.bench_with_input(
            BenchmarkId::new(strategy.to_string(), &size_label),
            &strategy,
            |b, strategy: &BalancingStrategy| {
                b.iter_batched(
                    || {
                        let rng = StdRng::seed_from_u64(1);
                        let selector = build_strategy(*strategy, &weights);
                        (rng, selector)
                    },
                    |(mut rng, mut selector)| {
                        let mut ctx = SelectionContext {
                            servers: &servers,
                            time: 0.0,
                            rng: &mut rng,
                        };
                        for _ in 0..ITERATIONS {
                            let selection = selector.select(&mut ctx);
                            black_box(selection);
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_selection);
criterion_main!(benches);
