use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::hardware::HardwareConfig;
use crate::metrics::{AggregatedMetrics, ServerBreakdown};
use crate::server::ServerStatistics;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HardwareSummary {
    pub profile: String,
    pub cpu_speed: f64,
    pub memory_capacity: u32,
    pub io_latency: f64,
    pub processing_power: f64,
    pub num_cores: usize,
}

impl HardwareSummary {
    pub fn new(profile: String, config: &HardwareConfig) -> Self {
        Self {
            profile,
            cpu_speed: config.cpu_speed,
            memory_capacity: config.memory_capacity,
            io_latency: config.io_latency,
            processing_power: config.processing_power,
            num_cores: config.num_cores,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResultMetrics {
    #[serde(flatten)]
    pub aggregate: AggregatedMetrics,
    pub success_rate: f64,
}

impl From<AggregatedMetrics> for ResultMetrics {
    fn from(aggregate: AggregatedMetrics) -> Self {
        let success_rate = aggregate.success_rate();
        Self {
            aggregate,
            success_rate,
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SimulationResult {
    pub scenario: String,
    pub duration: f64,
    pub num_servers: usize,
    pub hardware: HardwareSummary,
    pub language: String,
    pub traffic_pattern: String,
    pub balancing_strategy: String,
    pub base_request_rate: f64,
    pub metrics: ResultMetrics,
    pub per_server_stats: BTreeMap<usize, ServerBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_details: Option<Vec<ServerStatistics>>,
}
