use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::algorithms::{build_strategy, SelectionContext, SelectionStrategy};
use crate::config::validate_scenario;
use crate::error::{Error, Result};
use crate::events::{Event, Request};
use crate::metrics::{AggregatedMetrics, MetricsCollector};
use crate::models::Scenario;
use crate::scheduler::Scheduler;
use crate::server::{ProcessingModel, Server};
use crate::state::{HardwareSummary, SimulationResult};
use crate::traffic::{build_generator, TrafficGenerator};

pub type CallbackResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub type MetricsCallback = Box<dyn FnMut(&AggregatedMetrics, f64) -> CallbackResult>;

const TRAFFIC_STREAM: u64 = 0;
const BALANCER_STREAM: u64 = u64::MAX;

/// Derives an independent random stream per component from one scenario seed.
fn stream(seed: Option<u64>, salt: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => StdRng::from_entropy(),
    }
}

pub struct LoadSimulator {
    scenario: Scenario,
    scheduler: Scheduler<Event>,
    world: World,
    started: bool,
}

struct World {
    servers: Vec<Server>,
    strategy: Box<dyn SelectionStrategy>,
    balancer_rng: StdRng,
    generator: Box<dyn TrafficGenerator>,
    collector: MetricsCollector,
    callbacks: Vec<MetricsCallback>,
    interval: f64,
    duration: f64,
    processing_time: f64,
    next_request_id: u64,
    admitted: u64,
    dropped: u64,
}

impl LoadSimulator {
    pub fn new(scenario: Scenario) -> Result<Self> {
        validate_scenario(&scenario)?;

        let hardware = Arc::new(scenario.hardware.resolve());
        let language = Arc::new(scenario.language.profile());
        let model = ProcessingModel {
            distribution: scenario.processing_time_distribution,
            stddev: scenario.processing_time_stddev,
            network_latency_mean: scenario.network_latency_mean,
            network_latency_stddev: scenario.network_latency_stddev,
            cpu_degradation_enabled: scenario.cpu_degradation_enabled,
        };
        let servers = (0..scenario.num_servers)
            .map(|id| {
                Server::new(
                    id,
                    Arc::clone(&hardware),
                    Arc::clone(&language),
                    scenario.request_timeout,
                    model.clone(),
                    stream(scenario.random_seed, id as u64 + 1),
                )
            })
            .collect();

        let generator = build_generator(
            scenario.traffic_pattern,
            scenario.base_request_rate,
            &scenario.traffic,
            scenario.spikes.clone(),
            stream(scenario.random_seed, TRAFFIC_STREAM),
        );

        let world = World {
            servers,
            strategy: build_strategy(scenario.balancing_strategy, &scenario.weights),
            balancer_rng: stream(scenario.random_seed, BALANCER_STREAM),
            generator,
            collector: MetricsCollector::new(scenario.max_metrics),
            callbacks: Vec::new(),
            interval: scenario.metrics_interval,
            duration: scenario.duration,
            processing_time: scenario.request_processing_time,
            next_request_id: 0,
            admitted: 0,
            dropped: 0,
        };

        Ok(Self {
            scenario,
            scheduler: Scheduler::new(),
            world,
            started: false,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn register_metrics_callback<F>(&mut self, callback: F, interval: f64)
    where
        F: FnMut(&AggregatedMetrics, f64) -> CallbackResult + 'static,
    {
        self.world.callbacks.push(Box::new(callback));
        if interval > 0.0 && interval.is_finite() {
            self.world.interval = interval;
        }
    }

    /// A simulator runs once; later calls are no-ops.
    pub fn run(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;

        info!(
            scenario = %self.scenario.name,
            servers = self.scenario.num_servers,
            strategy = %self.scenario.balancing_strategy,
            pattern = %self.scenario.traffic_pattern,
            duration = self.scenario.duration,
            "starting simulation"
        );

        let first_arrival = self.world.generator.next_arrival_delay(0.0);
        self.scheduler.schedule_after(first_arrival, Event::Arrival)?;
        self.scheduler
            .schedule_after(self.world.interval, Event::SampleMetrics)?;

        let duration = self.world.duration;
        let world = &mut self.world;
        self.scheduler
            .run_until(duration, |scheduler, event| world.dispatch(scheduler, event))?;
        self.scheduler
            .run(|scheduler, event| world.dispatch(scheduler, event))?;

        info!(
            scenario = %self.scenario.name,
            admitted = self.world.admitted,
            dropped = self.world.dropped,
            recorded = self.world.collector.len(),
            events = self.scheduler.dispatched(),
            end_time = self.scheduler.now(),
            "simulation finished"
        );
        Ok(())
    }

    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn servers(&self) -> &[Server] {
        &self.world.servers
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.world.collector
    }

    pub fn dropped_requests(&self) -> u64 {
        self.world.dropped
    }

    pub fn results(&self) -> SimulationResult {
        let collector = &self.world.collector;
        let hardware = self.scenario.hardware.resolve();
        SimulationResult {
            scenario: self.scenario.name.clone(),
            duration: self.scenario.duration,
            num_servers: self.scenario.num_servers,
            hardware: HardwareSummary::new(self.scenario.hardware.label(), &hardware),
            language: self.scenario.language.profile().name,
            traffic_pattern: self.scenario.traffic_pattern.to_string(),
            balancing_strategy: self.scenario.balancing_strategy.to_string(),
            base_request_rate: self.scenario.base_request_rate,
            metrics: collector.aggregate(self.scenario.duration).into(),
            per_server_stats: collector.per_server_breakdown(),
            server_details: None,
        }
    }

    pub fn detailed_results(&self) -> SimulationResult {
        let mut result = self.results();
        result.server_details = Some(
            self.world
                .servers
                .iter()
                .map(Server::statistics)
                .collect(),
        );
        result
    }
}

impl World {
    fn dispatch(&mut self, scheduler: &mut Scheduler<Event>, event: Event) -> Result<()> {
        match event {
            Event::Arrival => self.on_arrival(scheduler),
            Event::RaceFinished {
                server_id,
                request_id,
                attempt,
                side,
            } => {
                let server = self.servers.get_mut(server_id).ok_or_else(|| {
                    Error::InvariantViolation(format!("event for unknown server {}", server_id))
                })?;
                server.resolve_race(request_id, attempt, side, scheduler, &mut self.collector)
            }
            Event::SampleMetrics => self.on_sample(scheduler),
        }
    }

    fn on_arrival(&mut self, scheduler: &mut Scheduler<Event>) -> Result<()> {
        let now = scheduler.now();
        if now >= self.duration {
            return Ok(());
        }

        self.next_request_id += 1;
        let request = Request::new(self.next_request_id, now, self.processing_time);
        let mut ctx = SelectionContext {
            servers: &self.servers,
            time: now,
            rng: &mut self.balancer_rng,
        };
        match self.strategy.select(&mut ctx) {
            Some(selection) => {
                debug!(
                    request = request.id,
                    server = selection.server_id,
                    score = ?selection.score,
                    time = now,
                    "routed"
                );
                let server = self.servers.get_mut(selection.server_id).ok_or_else(|| {
                    Error::InvariantViolation(format!(
                        "balancer picked unknown server {}",
                        selection.server_id
                    ))
                })?;
                server.enqueue(request, scheduler, &mut self.collector)?;
                self.admitted += 1;
            }
            None => {
                self.dropped += 1;
                debug!(request = request.id, time = now, "no server available, dropped");
            }
        }

        let delay = self.generator.next_arrival_delay(now);
        scheduler.schedule_after(delay, Event::Arrival)?;
        Ok(())
    }

    fn on_sample(&mut self, scheduler: &mut Scheduler<Event>) -> Result<()> {
        let now = scheduler.now();
        if now > self.duration {
            return Ok(());
        }

        for server in &self.servers {
            self.collector
                .record_utilization(server.id(), server.utilization());
        }

        if !self.callbacks.is_empty() {
            let metrics = self.collector.aggregate(now);
            for callback in self.callbacks.iter_mut() {
                if let Err(err) = callback(&metrics, now) {
                    warn!(time = now, error = %err, "metrics callback failed");
                }
            }
        }

        scheduler.schedule_after(self.interval, Event::SampleMetrics)?;
        Ok(())
    }
}

pub fn run_scenario(scenario: &Scenario) -> Result<SimulationResult> {
    let mut simulator = LoadSimulator::new(scenario.clone())?;
    simulator.run()?;
    Ok(simulator.results())
}
