use std::fmt::Write;

use crate::error::{Error, Result};
use crate::state::SimulationResult;

pub trait Formatter {
    fn write(&self, results: &[SimulationResult]) -> Result<String>;
}

pub struct HumanFormatter;

pub struct SummaryFormatter;

pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, results: &[SimulationResult]) -> Result<String> {
        let mut out = String::new();
        for (idx, result) in results.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            write_human(&mut out, result).map_err(|err| Error::Output(err.to_string()))?;
        }
        Ok(out)
    }
}

fn write_human(out: &mut String, result: &SimulationResult) -> std::fmt::Result {
    let metrics = &result.metrics.aggregate;
    writeln!(out, "Scenario: {}", result.scenario)?;
    writeln!(
        out,
        "Servers: {} x {} ({} cores, {})",
        result.num_servers, result.hardware.profile, result.hardware.num_cores, result.language
    )?;
    writeln!(
        out,
        "Traffic: {} at {} req/unit",
        result.traffic_pattern, result.base_request_rate
    )?;
    writeln!(out, "Strategy: {}", result.balancing_strategy)?;
    writeln!(out, "Duration: {}", result.duration)?;
    writeln!(
        out,
        "Requests: {} total, {} successful, {} timed out, {} errors",
        metrics.total_requests,
        metrics.successful_requests,
        metrics.timed_out_requests,
        metrics.error_requests
    )?;
    writeln!(
        out,
        "Success rate: {:.1}%",
        result.metrics.success_rate * 100.0
    )?;
    writeln!(
        out,
        "Response time: avg {:.3}, min {:.3}, max {:.3}, stddev {:.3}",
        metrics.avg_response_time,
        metrics.min_response_time,
        metrics.max_response_time,
        metrics.response_time_stddev
    )?;
    match &metrics.response_time_percentiles {
        Some(p) => writeln!(
            out,
            "Percentiles: p50 {:.3}, p95 {:.3}, p99 {:.3}, p99.9 {:.3}",
            p.p50, p.p95, p.p99, p.p999
        )?,
        None => writeln!(out, "Percentiles: n/a")?,
    }
    writeln!(
        out,
        "Queue time: avg {:.3}, max {:.3}",
        metrics.avg_queue_time, metrics.max_queue_time
    )?;
    writeln!(
        out,
        "Throughput: {:.2} successful/unit, {:.2} total/unit",
        metrics.successful_throughput, metrics.total_throughput
    )?;
    writeln!(
        out,
        "Utilization: avg {:.1}%, max {:.1}%",
        metrics.avg_server_utilization * 100.0,
        metrics.max_server_utilization * 100.0
    )?;
    writeln!(out, "Per server:")?;
    for (server_id, stats) in &result.per_server_stats {
        writeln!(
            out,
            "- server {}: {} requests, {} ok, {} failed, avg {:.3} (min {:.3}, max {:.3})",
            server_id,
            stats.total_requests,
            stats.successful_requests,
            stats.failed_requests,
            stats.avg_response_time,
            stats.min_response_time,
            stats.max_response_time
        )?;
    }
    if let Some(details) = &result.server_details {
        writeln!(out, "Server state:")?;
        for server in details {
            writeln!(
                out,
                "- server {}: utilization {:.1}%, queue {}, avg {:.3}",
                server.server_id,
                server.current_utilization * 100.0,
                server.queue_length,
                server.avg_response_time
            )?;
        }
    }
    Ok(())
}

impl Formatter for SummaryFormatter {
    fn write(&self, results: &[SimulationResult]) -> Result<String> {
        let mut out = String::new();
        for result in results {
            let metrics = &result.metrics.aggregate;
            writeln!(
                out,
                "{}: {} reqs, {:.1} avg, {:.1} rps, {:.0}% success",
                result.scenario,
                metrics.total_requests,
                metrics.avg_response_time,
                metrics.total_throughput,
                result.metrics.success_rate * 100.0
            )
            .map_err(|err| Error::Output(err.to_string()))?;
        }
        Ok(out)
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, results: &[SimulationResult]) -> Result<String> {
        let mut out =
            serde_json::to_string_pretty(results).map_err(|err| Error::Output(err.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}
