use rand::rngs::StdRng;
use rand_distr::{Distribution, LogNormal, Normal};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracing::trace;

use crate::error::{Error, Result};
use crate::events::{Event, RaceSide, Request};
use crate::hardware::{HardwareConfig, LanguageProfile};
use crate::metrics::{MetricsCollector, RequestOutcome, RequestStatus};
use crate::models::ProcessingDistribution;
use crate::scheduler::{EventId, Scheduler};

pub const MIN_PROCESSING_TIME: f64 = 0.1;

const DEGRADATION_THRESHOLD: f64 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessingModel {
    pub distribution: ProcessingDistribution,
    pub stddev: f64,
    pub network_latency_mean: f64,
    pub network_latency_stddev: f64,
    pub cpu_degradation_enabled: bool,
}

impl Default for ProcessingModel {
    fn default() -> Self {
        Self {
            distribution: ProcessingDistribution::Normal,
            stddev: 0.0,
            network_latency_mean: 0.0,
            network_latency_stddev: 0.0,
            cpu_degradation_enabled: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ServerStatistics {
    pub server_id: usize,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub timed_out_requests: u64,
    pub error_requests: u64,
    pub avg_response_time: f64,
    pub current_utilization: f64,
    pub queue_length: usize,
}

struct InFlight {
    request: Request,
    start_time: f64,
    processing_time: f64,
    attempt: u64,
    completion: EventId,
    timeout: EventId,
}

// Workers are not processes: a worker is "idle" when `idle_workers > 0`, and
// picks up work whenever a request is enqueued or another request finishes.
// Each started request races a completion event against a timeout event;
// the first to fire decides the outcome and cancels the other.
pub struct Server {
    id: usize,
    hardware: Arc<HardwareConfig>,
    language: Arc<LanguageProfile>,
    worker_count: usize,
    timeout: f64,
    model: ProcessingModel,
    queue: VecDeque<Request>,
    in_flight: BTreeMap<u64, InFlight>,
    idle_workers: usize,
    next_attempt: u64,
    processed: u64,
    successful: u64,
    timed_out: u64,
    errors: u64,
    response_times: Vec<f64>,
    response_time_sum: f64,
    rng: StdRng,
}

impl Server {
    pub fn new(
        id: usize,
        hardware: Arc<HardwareConfig>,
        language: Arc<LanguageProfile>,
        timeout: f64,
        model: ProcessingModel,
        rng: StdRng,
    ) -> Self {
        let worker_count = hardware.num_cores.max(1);
        Self {
            id,
            hardware,
            language,
            worker_count,
            timeout,
            model,
            queue: VecDeque::new(),
            in_flight: BTreeMap::new(),
            idle_workers: worker_count,
            next_attempt: 0,
            processed: 0,
            successful: 0,
            timed_out: 0,
            errors: 0,
            response_times: Vec::new(),
            response_time_sum: 0.0,
            rng,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn queue_length(&self) -> usize {
        self.queue.len() + self.in_flight.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn has_history(&self) -> bool {
        !self.response_times.is_empty()
    }

    pub fn mean_response_time(&self) -> f64 {
        if self.response_times.is_empty() {
            0.0
        } else {
            self.response_time_sum / self.response_times.len() as f64
        }
    }

    pub fn response_times(&self) -> &[f64] {
        &self.response_times
    }

    pub fn utilization(&self) -> f64 {
        (self.in_flight.len() as f64 / self.worker_count as f64).min(1.0)
    }

    // Servers never go offline in this model.
    pub fn is_available(&self) -> bool {
        true
    }

    pub fn statistics(&self) -> ServerStatistics {
        ServerStatistics {
            server_id: self.id,
            total_requests: self.processed,
            successful_requests: self.successful,
            timed_out_requests: self.timed_out,
            error_requests: self.errors,
            avg_response_time: self.mean_response_time(),
            current_utilization: self.utilization(),
            queue_length: self.queue_length(),
        }
    }

    pub fn enqueue(
        &mut self,
        request: Request,
        scheduler: &mut Scheduler<Event>,
        collector: &mut MetricsCollector,
    ) -> Result<()> {
        trace!(
            server = self.id,
            request = request.id,
            time = scheduler.now(),
            "queued"
        );
        self.queue.push_back(request);
        self.dispatch_idle_workers(scheduler, collector)
    }

    // Settles a race for `request_id`. Stale attempts are ignored.
    pub fn resolve_race(
        &mut self,
        request_id: u64,
        attempt: u64,
        side: RaceSide,
        scheduler: &mut Scheduler<Event>,
        collector: &mut MetricsCollector,
    ) -> Result<()> {
        match self.in_flight.get(&request_id) {
            Some(flight) if flight.attempt == attempt => {}
            _ => return Ok(()),
        }
        let Some(flight) = self.in_flight.remove(&request_id) else {
            return Ok(());
        };

        let (loser, status) = match side {
            RaceSide::Completion => (flight.timeout, RequestStatus::Success),
            RaceSide::Timeout => (flight.completion, RequestStatus::Timeout),
        };
        scheduler.cancel(loser);

        let now = scheduler.now();
        trace!(
            server = self.id,
            request = request_id,
            status = %status,
            elapsed = now - flight.start_time,
            sampled = flight.processing_time,
            "race settled"
        );
        self.finish(flight.request, flight.start_time, now, status, collector)?;
        self.dispatch_idle_workers(scheduler, collector)
    }

    fn dispatch_idle_workers(
        &mut self,
        scheduler: &mut Scheduler<Event>,
        collector: &mut MetricsCollector,
    ) -> Result<()> {
        while self.idle_workers > 0 {
            let Some(request) = self.queue.pop_front() else {
                break;
            };
            self.idle_workers -= 1;
            self.start(request, scheduler, collector)?;
        }
        Ok(())
    }

    fn start(
        &mut self,
        mut request: Request,
        scheduler: &mut Scheduler<Event>,
        collector: &mut MetricsCollector,
    ) -> Result<()> {
        let now = scheduler.now();
        let queue_wait = now - request.arrival_time;
        let remaining_timeout = self.timeout - queue_wait;
        if remaining_timeout <= 0.0 {
            trace!(
                server = self.id,
                request = request.id,
                queue_wait,
                "timed out in queue"
            );
            return self.finish(request, now, now, RequestStatus::Timeout, collector);
        }

        let base = self
            .hardware
            .estimate_request_time(request.processing_time / self.language.efficiency_factor);
        let sampled = self.sample_processing_time(base)?;
        let factor = if self.model.cpu_degradation_enabled {
            degradation_factor(self.utilization())
        } else {
            1.0
        };
        let processing_time = sampled * factor;
        let network_latency = self.sample_network_latency()?;
        request.network_latency = Some(network_latency);

        let attempt = self.next_attempt;
        self.next_attempt += 1;
        // Completion goes in first so it wins an exact tie with the timeout.
        let completion = scheduler.schedule_after(
            processing_time + network_latency,
            Event::RaceFinished {
                server_id: self.id,
                request_id: request.id,
                attempt,
                side: RaceSide::Completion,
            },
        )?;
        let timeout = scheduler.schedule_after(
            remaining_timeout,
            Event::RaceFinished {
                server_id: self.id,
                request_id: request.id,
                attempt,
                side: RaceSide::Timeout,
            },
        )?;

        trace!(
            server = self.id,
            request = request.id,
            processing_time,
            network_latency,
            remaining_timeout,
            "processing"
        );
        self.in_flight.insert(
            request.id,
            InFlight {
                request,
                start_time: now,
                processing_time,
                attempt,
                completion,
                timeout,
            },
        );
        Ok(())
    }

    fn finish(
        &mut self,
        request: Request,
        start_time: f64,
        completion_time: f64,
        status: RequestStatus,
        collector: &mut MetricsCollector,
    ) -> Result<()> {
        let outcome = RequestOutcome::new(
            request.id,
            request.arrival_time,
            start_time,
            completion_time,
            status,
            self.id,
        )?;
        self.processed += 1;
        match status {
            RequestStatus::Success => self.successful += 1,
            RequestStatus::Timeout => self.timed_out += 1,
            RequestStatus::Error => self.errors += 1,
        }
        self.response_times.push(outcome.response_time);
        self.response_time_sum += outcome.response_time;
        collector.record(outcome);
        self.idle_workers += 1;
        Ok(())
    }

    fn sample_processing_time(&mut self, base: f64) -> Result<f64> {
        let stddev = self.model.stddev;
        if stddev <= 0.0 {
            return Ok(base);
        }
        let sample = match self.model.distribution {
            ProcessingDistribution::Normal => Normal::new(base, stddev)
                .map_err(|err| distribution_error("normal", err))?
                .sample(&mut self.rng),
            ProcessingDistribution::Lognormal => {
                let spread = 1.0 + (stddev / base).powi(2);
                let mu = (base / spread.sqrt()).ln();
                let sigma = spread.ln().sqrt();
                LogNormal::new(mu, sigma)
                    .map_err(|err| distribution_error("lognormal", err))?
                    .sample(&mut self.rng)
            }
        };
        Ok(sample.max(MIN_PROCESSING_TIME))
    }

    fn sample_network_latency(&mut self) -> Result<f64> {
        if self.model.network_latency_mean <= 0.0 {
            return Ok(0.0);
        }
        let latency = Normal::new(
            self.model.network_latency_mean,
            self.model.network_latency_stddev,
        )
        .map_err(|err| distribution_error("network latency", err))?
        .sample(&mut self.rng);
        Ok(latency.max(0.0))
    }
}

fn distribution_error(kind: &str, err: impl std::fmt::Display) -> Error {
    Error::InvariantViolation(format!("{} distribution rejected parameters: {}", kind, err))
}

// Flat up to half load, then grows as `e^(2 * excess)` so that a saturated
// server runs about 7.39 times slower.
pub fn degradation_factor(utilization: f64) -> f64 {
    if utilization <= DEGRADATION_THRESHOLD {
        return 1.0;
    }
    let excess = (utilization - DEGRADATION_THRESHOLD) / DEGRADATION_THRESHOLD;
    1.0 + ((2.0 * excess).exp() - 1.0)
}

#[cfg(test)]
impl Server {
    pub(crate) fn test_server(id: usize, workers: usize, timeout: f64) -> Self {
        use rand::SeedableRng;

        let hardware = HardwareConfig {
            cpu_speed: 1.0,
            memory_capacity: 1,
            io_latency: 0.0,
            processing_power: 1.0,
            num_cores: workers,
        };
        let language = LanguageProfile {
            name: "unit".to_string(),
            efficiency_factor: 1.0,
            memory_overhead: 0.0,
            startup_time: 0.0,
        };
        Server::new(
            id,
            Arc::new(hardware),
            Arc::new(language),
            timeout,
            ProcessingModel {
                cpu_degradation_enabled: false,
                ..ProcessingModel::default()
            },
            StdRng::seed_from_u64(id as u64),
        )
    }

    pub(crate) fn with_load(mut self, queued: usize, history: &[f64]) -> Self {
        for idx in 0..queued {
            self.queue.push_back(Request::new(idx as u64, 0.0, 1.0));
        }
        for value in history {
            self.response_times.push(*value);
            self.response_time_sum += value;
        }
        self
    }
}
