use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::hardware::HardwareSpec;
use crate::models::{Scenario, TrafficPattern};
use crate::traffic::{MAX_BURST_SIZE_MEAN, MAX_MEAN_BURST_SIZE};

pub const MIN_DURATION: f64 = 0.01;
pub const MAX_DURATION: f64 = 86_400.0;
pub const MIN_SERVERS: usize = 1;
pub const MAX_SERVERS: usize = 1_000;
pub const MAX_REQUEST_RATE: f64 = 100_000.0;
pub const MIN_TIMEOUT: f64 = 100.0;
pub const MAX_TIMEOUT: f64 = 3_600_000.0;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

pub fn load_scenarios(path: &Path) -> Result<ScenarioFile> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}

/// Loads a file and checks it end to end: at least one scenario, unique
/// names, and every scenario individually valid.
pub fn load_validated(path: &Path) -> Result<Vec<Scenario>> {
    let file = load_scenarios(path)?;
    validate_file(&file, &path.display().to_string())?;
    Ok(file.scenarios)
}

pub fn validate_file(file: &ScenarioFile, source: &str) -> Result<()> {
    if file.scenarios.is_empty() {
        return Err(Error::NoScenarios(source.to_string()));
    }
    let mut names = HashSet::new();
    for scenario in &file.scenarios {
        if !names.insert(scenario.name.as_str()) {
            return Err(Error::DuplicateScenarioName(scenario.name.clone()));
        }
    }
    for scenario in &file.scenarios {
        validate_scenario(scenario)?;
    }
    Ok(())
}

pub fn find_scenario<'a>(scenarios: &'a [Scenario], name: &str) -> Result<&'a Scenario> {
    scenarios
        .iter()
        .find(|scenario| scenario.name == name)
        .ok_or_else(|| Error::ScenarioNotFound(name.to_string()))
}

pub fn validate_scenario(scenario: &Scenario) -> Result<()> {
    let mut violations = Vec::new();

    if scenario.name.trim().is_empty() {
        violations.push("name must be a non-empty string".to_string());
    }

    check_range(
        &mut violations,
        "duration",
        scenario.duration,
        MIN_DURATION,
        MAX_DURATION,
    );
    if scenario.num_servers < MIN_SERVERS {
        violations.push(format!(
            "num_servers must be >= {} (got {})",
            MIN_SERVERS, scenario.num_servers
        ));
    } else if scenario.num_servers > MAX_SERVERS {
        violations.push(format!(
            "num_servers must be <= {} (got {})",
            MAX_SERVERS, scenario.num_servers
        ));
    }
    check_range(
        &mut violations,
        "base_request_rate",
        scenario.base_request_rate,
        0.0,
        MAX_REQUEST_RATE,
    );
    check_range(
        &mut violations,
        "request_timeout",
        scenario.request_timeout,
        MIN_TIMEOUT,
        MAX_TIMEOUT,
    );
    check_positive(
        &mut violations,
        "request_processing_time",
        scenario.request_processing_time,
    );
    check_non_negative(
        &mut violations,
        "processing_time_stddev",
        scenario.processing_time_stddev,
    );
    check_non_negative(
        &mut violations,
        "network_latency_mean",
        scenario.network_latency_mean,
    );
    check_non_negative(
        &mut violations,
        "network_latency_stddev",
        scenario.network_latency_stddev,
    );
    check_positive(
        &mut violations,
        "metrics_interval",
        scenario.metrics_interval,
    );
    if scenario.max_metrics < 1 {
        violations.push("max_metrics must be >= 1 (got 0)".to_string());
    }

    if let HardwareSpec::Custom(hardware) = &scenario.hardware {
        check_positive(
            &mut violations,
            "hardware.processing_power",
            hardware.processing_power,
        );
        check_non_negative(&mut violations, "hardware.io_latency", hardware.io_latency);
        check_non_negative(&mut violations, "hardware.cpu_speed", hardware.cpu_speed);
        if hardware.num_cores < 1 {
            violations.push("hardware.num_cores must be >= 1 (got 0)".to_string());
        }
    }

    for (idx, spike) in scenario.spikes.iter().enumerate() {
        check_non_negative(
            &mut violations,
            &format!("spikes[{}].start_time", idx),
            spike.start_time,
        );
        check_positive(
            &mut violations,
            &format!("spikes[{}].duration", idx),
            spike.duration,
        );
        check_positive(
            &mut violations,
            &format!("spikes[{}].intensity_multiplier", idx),
            spike.intensity_multiplier,
        );
    }

    validate_traffic(scenario, &mut violations);

    if scenario.weights.len() > scenario.num_servers {
        violations.push(format!(
            "weights has {} entries but there are only {} servers",
            scenario.weights.len(),
            scenario.num_servers
        ));
    }
    for (idx, weight) in scenario.weights.iter().enumerate() {
        check_positive(&mut violations, &format!("weights[{}]", idx), *weight);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidScenario {
            name: scenario.name.clone(),
            violations,
        })
    }
}

fn validate_traffic(scenario: &Scenario, violations: &mut Vec<String>) {
    let traffic = &scenario.traffic;
    if let Some(amplitude) = traffic.amplitude_factor {
        check_non_negative(violations, "traffic.amplitude_factor", amplitude);
    }
    // Only the active pattern's knobs matter.
    match scenario.traffic_pattern {
        TrafficPattern::Bursty => {
            check_range(
                violations,
                "traffic.burst_size_mean",
                traffic.burst_size_mean,
                0.0,
                MAX_BURST_SIZE_MEAN,
            );
            check_positive(violations, "traffic.burst_interval", traffic.burst_interval);
        }
        TrafficPattern::Periodic => {
            check_positive(violations, "traffic.period", traffic.period);
        }
        TrafficPattern::Wave => {
            check_positive(violations, "traffic.wave_period", traffic.wave_period);
        }
        TrafficPattern::ExponentialBurst => {
            check_non_negative(violations, "traffic.burst_rate", traffic.burst_rate);
            check_range(
                violations,
                "traffic.mean_burst_size",
                traffic.mean_burst_size,
                0.0,
                MAX_MEAN_BURST_SIZE,
            );
        }
        TrafficPattern::Poisson | TrafficPattern::Constant => {}
    }
}

fn check_range(violations: &mut Vec<String>, field: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() {
        violations.push(format!("{} must be a finite number (got {})", field, value));
    } else if value < min {
        violations.push(format!("{} must be >= {} (got {})", field, min, value));
    } else if value > max {
        violations.push(format!("{} must be <= {} (got {})", field, max, value));
    }
}

fn check_positive(violations: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() {
        violations.push(format!("{} must be a finite number (got {})", field, value));
    } else if value <= 0.0 {
        violations.push(format!("{} must be > 0 (got {})", field, value));
    }
}

fn check_non_negative(violations: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() {
        violations.push(format!("{} must be a finite number (got {})", field, value));
    } else if value < 0.0 {
        violations.push(format!("{} must be >= 0 (got {})", field, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::HardwareConfig;
    use crate::models::TrafficSpike;

    fn violations(scenario: &Scenario) -> Vec<String> {
        match validate_scenario(scenario) {
            Err(Error::InvalidScenario { violations, .. }) => violations,
            Err(other) => panic!("unexpected error: {}", other),
            Ok(()) => Vec::new(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_scenario(&Scenario::named("baseline")).is_ok());
    }

    #[test]
    fn every_violation_is_reported() {
        let mut scenario = Scenario::named("broken");
        scenario.duration = 0.0;
        scenario.num_servers = 0;
        scenario.base_request_rate = -1.0;
        scenario.request_timeout = 50.0;
        scenario.request_processing_time = 0.0;

        let found = violations(&scenario);
        assert_eq!(found.len(), 5, "{:?}", found);
        assert_eq!(found[0], "duration must be >= 0.01 (got 0)");
        assert_eq!(found[1], "num_servers must be >= 1 (got 0)");
        assert_eq!(found[2], "base_request_rate must be >= 0 (got -1)");
        assert_eq!(found[3], "request_timeout must be >= 100 (got 50)");
        assert_eq!(found[4], "request_processing_time must be > 0 (got 0)");
    }

    #[test]
    fn upper_bounds_are_enforced() {
        let mut scenario = Scenario::named("huge");
        scenario.duration = 100_000.0;
        scenario.num_servers = 1_001;
        scenario.base_request_rate = 100_001.0;
        scenario.request_timeout = 4_000_000.0;
        assert_eq!(violations(&scenario).len(), 4);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut scenario = Scenario::named("nan");
        scenario.network_latency_mean = f64::NAN;
        scenario.duration = f64::INFINITY;
        let found = violations(&scenario);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|v| v.contains("finite")));
    }

    #[test]
    fn spikes_and_weights_are_checked() {
        let mut scenario = Scenario::named("spiky");
        scenario.num_servers = 2;
        scenario.spikes = vec![TrafficSpike {
            start_time: -1.0,
            duration: 0.0,
            intensity_multiplier: 2.0,
        }];
        scenario.weights = vec![1.0, 0.0, 2.0];
        let found = violations(&scenario);
        assert!(found.contains(&"spikes[0].start_time must be >= 0 (got -1)".to_string()));
        assert!(found.contains(&"spikes[0].duration must be > 0 (got 0)".to_string()));
        assert!(found.contains(&"weights has 3 entries but there are only 2 servers".to_string()));
        assert!(found.contains(&"weights[1] must be > 0 (got 0)".to_string()));
    }

    #[test]
    fn only_active_pattern_params_are_checked() {
        let mut scenario = Scenario::named("traffic");
        scenario.traffic.period = 0.0;
        assert!(validate_scenario(&scenario).is_ok());

        scenario.traffic_pattern = TrafficPattern::Periodic;
        assert_eq!(
            violations(&scenario),
            vec!["traffic.period must be > 0 (got 0)".to_string()]
        );

        scenario.traffic_pattern = TrafficPattern::Bursty;
        scenario.traffic.burst_size_mean = 10_000.0;
        assert_eq!(violations(&scenario).len(), 1);
    }

    #[test]
    fn exponential_burst_mean_is_bounded() {
        let mut scenario = Scenario::named("bursts");
        scenario.traffic_pattern = TrafficPattern::ExponentialBurst;
        scenario.traffic.mean_burst_size = 1e15;
        assert_eq!(
            violations(&scenario),
            vec!["traffic.mean_burst_size must be <= 500 (got 1000000000000000)".to_string()]
        );

        scenario.traffic.mean_burst_size = MAX_MEAN_BURST_SIZE;
        assert!(validate_scenario(&scenario).is_ok());
    }

    #[test]
    fn custom_hardware_is_checked() {
        let mut scenario = Scenario::named("custom");
        scenario.hardware = HardwareSpec::Custom(HardwareConfig {
            cpu_speed: 1.0,
            memory_capacity: 1,
            io_latency: 0.0,
            processing_power: 0.0,
            num_cores: 0,
        });
        assert_eq!(violations(&scenario).len(), 2);
    }

    #[test]
    fn file_validation_rejects_duplicates_and_empty_lists() {
        let empty = ScenarioFile {
            scenarios: Vec::new(),
        };
        assert!(matches!(
            validate_file(&empty, "x.toml"),
            Err(Error::NoScenarios(_))
        ));

        let duplicated = ScenarioFile {
            scenarios: vec![Scenario::named("a"), Scenario::named("a")],
        };
        let err = validate_file(&duplicated, "x.toml").unwrap_err();
        assert_eq!(err.to_string(), "duplicate scenario name 'a'");
    }

    #[test]
    fn find_scenario_by_name() {
        let scenarios = vec![Scenario::named("a"), Scenario::named("b")];
        assert_eq!(find_scenario(&scenarios, "b").expect("found").name, "b");
        assert_eq!(
            find_scenario(&scenarios, "c").unwrap_err().to_string(),
            "scenario 'c' not found"
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_scenarios(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigIo(_)));
    }
}
