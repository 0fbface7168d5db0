use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_METRICS: usize = 1_000_000;
pub const DEFAULT_SNAPSHOT_LOOKAHEAD: f64 = 2.0;

const P50: f64 = 0.50;
const P95: f64 = 0.95;
const P99: f64 = 0.99;
const P999: f64 = 0.999;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Success,
    Timeout,
    // Reserved for injected faults; no modeled path produces it.
    Error,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestStatus::Success => "success",
            RequestStatus::Timeout => "timeout",
            RequestStatus::Error => "error",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RequestOutcome {
    pub sequence: u64,
    pub request_id: u64,
    pub arrival_time: f64,
    pub start_time: f64,
    pub completion_time: f64,
    pub status: RequestStatus,
    pub response_time: f64,
    pub queue_wait_time: f64,
    pub server_id: usize,
}

impl RequestOutcome {
    // A rejection means the scheduler dispatched something out of order.
    pub fn new(
        request_id: u64,
        arrival_time: f64,
        start_time: f64,
        completion_time: f64,
        status: RequestStatus,
        server_id: usize,
    ) -> Result<Self> {
        let response_time = completion_time - arrival_time;
        let queue_wait_time = start_time - arrival_time;
        if !(response_time >= 0.0) {
            return Err(Error::InvariantViolation(format!(
                "request {} has response_time {}",
                request_id, response_time
            )));
        }
        if !(queue_wait_time >= 0.0) {
            return Err(Error::InvariantViolation(format!(
                "request {} has queue_wait_time {}",
                request_id, queue_wait_time
            )));
        }
        Ok(Self {
            sequence: 0,
            request_id,
            arrival_time,
            start_time,
            completion_time,
            status,
            response_time,
            queue_wait_time,
            server_id,
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PercentileStats {
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct AggregatedMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub timed_out_requests: u64,
    pub error_requests: u64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub response_time_stddev: f64,
    pub response_time_percentiles: Option<PercentileStats>,
    pub avg_queue_time: f64,
    pub max_queue_time: f64,
    pub successful_throughput: f64,
    pub total_throughput: f64,
    pub avg_server_utilization: f64,
    pub max_server_utilization: f64,
    pub simulation_duration: f64,
}

impl AggregatedMetrics {
    pub fn empty(duration: f64) -> Self {
        Self {
            simulation_duration: duration,
            ..Self::default()
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerBreakdown {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
}

pub struct MetricsCollector {
    outcomes: VecDeque<RequestOutcome>,
    utilization: BTreeMap<usize, Vec<f64>>,
    max_metrics: usize,
    next_sequence: u64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_METRICS)
    }
}

impl MetricsCollector {
    pub fn new(max_metrics: usize) -> Self {
        let max_metrics = max_metrics.max(1);
        Self {
            outcomes: VecDeque::with_capacity(max_metrics.min(4_096)),
            utilization: BTreeMap::new(),
            max_metrics,
            next_sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &RequestOutcome> {
        self.outcomes.iter()
    }

    pub fn utilization_samples(&self, server_id: usize) -> &[f64] {
        self.utilization
            .get(&server_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn record(&mut self, mut outcome: RequestOutcome) -> u64 {
        self.next_sequence += 1;
        outcome.sequence = self.next_sequence;
        if self.outcomes.len() == self.max_metrics {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(outcome);
        self.next_sequence
    }

    pub fn record_utilization(&mut self, server_id: usize, value: f64) {
        self.utilization.entry(server_id).or_default().push(value);
    }

    pub fn aggregate(&self, duration: f64) -> AggregatedMetrics {
        self.calculate(self.outcomes.iter(), duration)
    }

    /// Aggregates only what had completed by `time + lookahead`, over `time`.
    pub fn snapshot_at(&self, time: f64, lookahead: f64) -> AggregatedMetrics {
        let horizon = time + lookahead;
        self.calculate(
            self.outcomes
                .iter()
                .filter(|outcome| outcome.completion_time <= horizon),
            time,
        )
    }

    pub fn per_server_breakdown(&self) -> BTreeMap<usize, ServerBreakdown> {
        let mut totals: BTreeMap<usize, (ServerBreakdown, f64)> = BTreeMap::new();
        for outcome in &self.outcomes {
            let (entry, sum) = totals.entry(outcome.server_id).or_insert_with(|| {
                (
                    ServerBreakdown {
                        min_response_time: f64::INFINITY,
                        max_response_time: f64::NEG_INFINITY,
                        ..ServerBreakdown::default()
                    },
                    0.0,
                )
            });
            entry.total_requests += 1;
            if outcome.status == RequestStatus::Success {
                entry.successful_requests += 1;
            } else {
                entry.failed_requests += 1;
            }
            entry.min_response_time = entry.min_response_time.min(outcome.response_time);
            entry.max_response_time = entry.max_response_time.max(outcome.response_time);
            *sum += outcome.response_time;
        }

        totals
            .into_iter()
            .map(|(server_id, (mut entry, sum))| {
                entry.avg_response_time = sum / entry.total_requests as f64;
                (server_id, entry)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
        self.utilization.clear();
        self.next_sequence = 0;
    }

    fn calculate<'a, I>(&self, outcomes: I, duration: f64) -> AggregatedMetrics
    where
        I: Iterator<Item = &'a RequestOutcome>,
    {
        let mut result = AggregatedMetrics::empty(duration);
        let mut response_times = Vec::new();
        let mut queue_sum = 0.0;
        let mut queue_max = 0.0_f64;

        for outcome in outcomes {
            match outcome.status {
                RequestStatus::Success => result.successful_requests += 1,
                RequestStatus::Timeout => result.timed_out_requests += 1,
                RequestStatus::Error => result.error_requests += 1,
            }
            response_times.push(outcome.response_time);
            queue_sum += outcome.queue_wait_time;
            queue_max = queue_max.max(outcome.queue_wait_time);
        }

        if response_times.is_empty() {
            return result;
        }

        let count = response_times.len() as f64;
        result.total_requests = response_times.len() as u64;
        let mean = response_times.iter().sum::<f64>() / count;
        result.avg_response_time = mean;
        result.response_time_stddev = population_stddev(&response_times, mean);

        response_times.sort_by(f64::total_cmp);
        result.min_response_time = response_times[0];
        result.max_response_time = response_times[response_times.len() - 1];
        result.response_time_percentiles = Some(PercentileStats {
            p50: percentile(&response_times, P50),
            p95: percentile(&response_times, P95),
            p99: percentile(&response_times, P99),
            p999: percentile(&response_times, P999),
        });

        result.avg_queue_time = queue_sum / count;
        result.max_queue_time = queue_max;

        if duration > 0.0 {
            result.successful_throughput = result.successful_requests as f64 / duration;
            result.total_throughput = result.total_requests as f64 / duration;
        }

        let mut samples = 0usize;
        let mut utilization_sum = 0.0;
        let mut utilization_max = 0.0_f64;
        for value in self.utilization.values().flatten() {
            samples += 1;
            utilization_sum += value;
            utilization_max = utilization_max.max(*value);
        }
        if samples > 0 {
            result.avg_server_utilization = utilization_sum / samples as f64;
            result.max_server_utilization = utilization_max;
        }

        result
    }
}

fn population_stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Linear interpolation at rank `p * (n - 1)` over sorted data.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        2 => {
            if p < 0.5 {
                sorted[0]
            } else {
                sorted[1]
            }
        }
        len => {
            let rank = p * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = lower + 1;
            if upper >= len {
                return sorted[lower.min(len - 1)];
            }
            let weight = rank - lower as f64;
            sorted[lower] * (1.0 - weight) + sorted[upper] * weight
        }
    }
}
