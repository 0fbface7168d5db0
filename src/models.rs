use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hardware::{HardwareSpec, Language};
use crate::metrics::DEFAULT_MAX_METRICS;
use crate::names::parse_by_label;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default = "default_num_servers", alias = "servers")]
    pub num_servers: usize,
    #[serde(default)]
    pub hardware: HardwareSpec,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_request_rate")]
    pub base_request_rate: f64,
    #[serde(default)]
    pub traffic_pattern: TrafficPattern,
    #[serde(default)]
    pub traffic: TrafficParams,
    #[serde(default)]
    pub spikes: Vec<TrafficSpike>,
    #[serde(default)]
    pub balancing_strategy: BalancingStrategy,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f64>,
    #[serde(default = "default_processing_time")]
    pub request_processing_time: f64,
    #[serde(default = "default_timeout")]
    pub request_timeout: f64,
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub processing_time_distribution: ProcessingDistribution,
    #[serde(default)]
    pub processing_time_stddev: f64,
    #[serde(default)]
    pub network_latency_mean: f64,
    #[serde(default)]
    pub network_latency_stddev: f64,
    #[serde(default = "default_true")]
    pub cpu_degradation_enabled: bool,
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval: f64,
    #[serde(default = "default_max_metrics")]
    pub max_metrics: usize,
}

impl Scenario {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            duration: default_duration(),
            num_servers: default_num_servers(),
            hardware: HardwareSpec::default(),
            language: Language::default(),
            base_request_rate: default_request_rate(),
            traffic_pattern: TrafficPattern::default(),
            traffic: TrafficParams::default(),
            spikes: Vec::new(),
            balancing_strategy: BalancingStrategy::default(),
            weights: Vec::new(),
            request_processing_time: default_processing_time(),
            request_timeout: default_timeout(),
            random_seed: None,
            processing_time_distribution: ProcessingDistribution::default(),
            processing_time_stddev: 0.0,
            network_latency_mean: 0.0,
            network_latency_stddev: 0.0,
            cpu_degradation_enabled: true,
            metrics_interval: default_metrics_interval(),
            max_metrics: default_max_metrics(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct TrafficSpike {
    pub start_time: f64,
    pub duration: f64,
    pub intensity_multiplier: f64,
}

impl TrafficSpike {
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time < self.start_time + self.duration
    }
}

/// Pattern-specific knobs. Each generator reads only the fields it needs.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TrafficParams {
    pub burst_size_mean: f64,
    pub burst_interval: f64,
    pub period: f64,
    /// Falls back to 0.5 for periodic traffic and 0.8 for wave traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amplitude_factor: Option<f64>,
    pub burst_rate: f64,
    pub mean_burst_size: f64,
    pub wave_period: f64,
    pub wave_type: WaveType,
}

impl Default for TrafficParams {
    fn default() -> Self {
        Self {
            burst_size_mean: 5.0,
            burst_interval: 2.0,
            period: 3600.0,
            amplitude_factor: None,
            burst_rate: 0.5,
            mean_burst_size: 8.0,
            wave_period: 60.0,
            wave_type: WaveType::Sine,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum WaveType {
    #[default]
    Sine,
    Square,
}

impl WaveType {
    pub const ALL: [WaveType; 2] = [WaveType::Sine, WaveType::Square];
}

parse_by_label!(WaveType, "wave type");

impl fmt::Display for WaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WaveType::Sine => "sine",
            WaveType::Square => "square",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TrafficPattern {
    #[default]
    Poisson,
    Bursty,
    Periodic,
    Constant,
    ExponentialBurst,
    Wave,
}

impl TrafficPattern {
    pub const ALL: [TrafficPattern; 6] = [
        TrafficPattern::Poisson,
        TrafficPattern::Bursty,
        TrafficPattern::Periodic,
        TrafficPattern::Constant,
        TrafficPattern::ExponentialBurst,
        TrafficPattern::Wave,
    ];

    pub fn description(self) -> &'static str {
        match self {
            TrafficPattern::Poisson => "exponential inter-arrival times at the base rate",
            TrafficPattern::Bursty => "Poisson-sized bursts on an exponential burst clock",
            TrafficPattern::Periodic => "cosine-modulated rate over a long period",
            TrafficPattern::Constant => "fixed spacing of 1/rate, no randomness",
            TrafficPattern::ExponentialBurst => "exponentially sized bursts at a burst rate",
            TrafficPattern::Wave => "sine or square modulated rate",
        }
    }
}

parse_by_label!(TrafficPattern, "traffic pattern");

impl fmt::Display for TrafficPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrafficPattern::Poisson => "poisson",
            TrafficPattern::Bursty => "bursty",
            TrafficPattern::Periodic => "periodic",
            TrafficPattern::Constant => "constant",
            TrafficPattern::ExponentialBurst => "exponential_burst",
            TrafficPattern::Wave => "wave",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum BalancingStrategy {
    #[default]
    RoundRobin,
    LeastConnections,
    WeightedRoundRobin,
    LeastResponseTime,
    Random,
    CpuAware,
}

impl BalancingStrategy {
    pub const ALL: [BalancingStrategy; 6] = [
        BalancingStrategy::RoundRobin,
        BalancingStrategy::LeastConnections,
        BalancingStrategy::WeightedRoundRobin,
        BalancingStrategy::LeastResponseTime,
        BalancingStrategy::Random,
        BalancingStrategy::CpuAware,
    ];

    pub fn description(self) -> &'static str {
        match self {
            BalancingStrategy::RoundRobin => "cycle through servers in order",
            BalancingStrategy::LeastConnections => "fewest queued plus in-flight requests",
            BalancingStrategy::WeightedRoundRobin => "random pick from a weight-proportional pool",
            BalancingStrategy::LeastResponseTime => "lowest queue length times mean response time",
            BalancingStrategy::Random => "uniform random choice",
            BalancingStrategy::CpuAware => "lowest queue length plus mean response time / 100",
        }
    }
}

parse_by_label!(BalancingStrategy, "balancing strategy");

impl fmt::Display for BalancingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BalancingStrategy::RoundRobin => "round_robin",
            BalancingStrategy::LeastConnections => "least_connections",
            BalancingStrategy::WeightedRoundRobin => "weighted_round_robin",
            BalancingStrategy::LeastResponseTime => "least_response_time",
            BalancingStrategy::Random => "random",
            BalancingStrategy::CpuAware => "cpu_aware",
        };
        write!(f, "{}", label)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ProcessingDistribution {
    #[default]
    Normal,
    Lognormal,
}

impl ProcessingDistribution {
    pub const ALL: [ProcessingDistribution; 2] =
        [ProcessingDistribution::Normal, ProcessingDistribution::Lognormal];
}

parse_by_label!(ProcessingDistribution, "processing time distribution");

impl fmt::Display for ProcessingDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessingDistribution::Normal => "normal",
            ProcessingDistribution::Lognormal => "lognormal",
        };
        write!(f, "{}", label)
    }
}

fn default_duration() -> f64 {
    600.0
}

fn default_num_servers() -> usize {
    1
}

fn default_request_rate() -> f64 {
    10.0
}

fn default_processing_time() -> f64 {
    100.0
}

fn default_timeout() -> f64 {
    30_000.0
}

fn default_true() -> bool {
    true
}

fn default_metrics_interval() -> f64 {
    1.0
}

fn default_max_metrics() -> usize {
    DEFAULT_MAX_METRICS
}
