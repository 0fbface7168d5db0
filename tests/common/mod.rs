#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// One worker at unit speed: a 0.2 request takes exactly 0.1 on the
/// default language profile, so constant traffic never queues.
pub const STEADY_TOML: &str = r#"
[[scenarios]]
name = "steady"
description = "constant load on one unit-speed server"
duration = 10.0
base_request_rate = 5.0
traffic_pattern = "constant"
request_processing_time = 0.2
hardware = { cpu_speed = 1.0, memory_capacity = 1, io_latency = 0.0, processing_power = 1.0, num_cores = 1 }

[[scenarios]]
name = "busy"
duration = 5.0
base_request_rate = 4.0
traffic_pattern = "constant"
request_processing_time = 0.2
hardware = { cpu_speed = 1.0, memory_capacity = 1, io_latency = 0.0, processing_power = 1.0, num_cores = 1 }
"#;

pub fn write_temp_config(contents: &str, extension: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be available")
        .as_nanos();
    path.push(format!(
        "load-sim-{}-{}.{}",
        std::process::id(),
        nanos,
        extension
    ));
    fs::write(&path, contents).expect("config write should succeed");
    path
}
