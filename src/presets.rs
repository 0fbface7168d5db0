use crate::error::{Error, Result};
use crate::hardware::{HardwareProfile, HardwareSpec, Language};
use crate::models::{BalancingStrategy, Scenario, TrafficPattern, TrafficSpike};
use crate::names::closest_match;

const PRESET_SEED: u64 = 42;

/// A built-in scenario group that runs without a config file.
#[derive(Clone, Copy, Debug)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Vec<Scenario>,
}

impl Preset {
    pub fn scenarios(&self) -> Vec<Scenario> {
        (self.build)()
    }
}

pub static PRESETS: [Preset; 6] = [
    Preset {
        name: "baseline",
        description: "one standard Python server under constant 10 rps",
        build: baseline,
    },
    Preset {
        name: "steady_state_poisson",
        description: "four Node.js servers under 20 rps Poisson traffic for 30 minutes",
        build: steady_state_poisson,
    },
    Preset {
        name: "traffic_spike",
        description: "three Go servers absorbing a 5x spike at t=300 for 60s",
        build: traffic_spike,
    },
    Preset {
        name: "bursty_traffic",
        description: "two Java servers under bursts of about 8 requests every 3s",
        build: bursty_traffic,
    },
    Preset {
        name: "language_comparison",
        description: "the same Poisson load against Python, Node.js, Java, Go and Rust",
        build: language_comparison,
    },
    Preset {
        name: "hardware_comparison",
        description: "the same Poisson load against every hardware profile",
        build: hardware_comparison,
    },
];

pub fn find_preset(name: &str) -> Result<&'static Preset> {
    let wanted = name.trim().to_lowercase();
    if let Some(preset) = PRESETS.iter().find(|preset| preset.name == wanted) {
        return Ok(preset);
    }
    let names: Vec<String> = PRESETS.iter().map(|preset| preset.name.to_string()).collect();
    Err(Error::UnknownPreset(match closest_match(&wanted, &names) {
        Some(suggestion) => format!("unknown preset '{}', did you mean '{}'?", name, suggestion),
        None => format!(
            "unknown preset '{}', expected one of: {}",
            name,
            names.join(", ")
        ),
    }))
}

fn seeded(name: impl Into<String>, seed: u64) -> Scenario {
    let mut scenario = Scenario::named(name);
    scenario.random_seed = Some(seed);
    scenario
}

fn baseline() -> Vec<Scenario> {
    let mut scenario = seeded("baseline", PRESET_SEED);
    scenario.description = Some("single server, constant load".to_string());
    scenario.duration = 600.0;
    scenario.num_servers = 1;
    scenario.language = Language::Python;
    scenario.base_request_rate = 10.0;
    scenario.traffic_pattern = TrafficPattern::Constant;
    scenario.balancing_strategy = BalancingStrategy::RoundRobin;
    vec![scenario]
}

fn steady_state_poisson() -> Vec<Scenario> {
    let mut scenario = seeded("steady_state_poisson", PRESET_SEED);
    scenario.description = Some("steady Poisson arrivals across a small fleet".to_string());
    scenario.duration = 1800.0;
    scenario.num_servers = 4;
    scenario.language = Language::Nodejs;
    scenario.base_request_rate = 20.0;
    scenario.traffic_pattern = TrafficPattern::Poisson;
    scenario.balancing_strategy = BalancingStrategy::LeastConnections;
    vec![scenario]
}

fn traffic_spike() -> Vec<Scenario> {
    let mut scenario = seeded("traffic_spike", PRESET_SEED);
    scenario.description = Some("Poisson load with a five-fold spike".to_string());
    scenario.duration = 600.0;
    scenario.num_servers = 3;
    scenario.hardware = HardwareSpec::Profile(HardwareProfile::HighPerformance);
    scenario.language = Language::Go;
    scenario.base_request_rate = 15.0;
    scenario.traffic_pattern = TrafficPattern::Poisson;
    scenario.balancing_strategy = BalancingStrategy::LeastConnections;
    scenario.spikes = vec![TrafficSpike {
        start_time: 300.0,
        duration: 60.0,
        intensity_multiplier: 5.0,
    }];
    vec![scenario]
}

fn bursty_traffic() -> Vec<Scenario> {
    let mut scenario = seeded("bursty_traffic", PRESET_SEED);
    scenario.description = Some("clustered arrivals".to_string());
    scenario.duration = 1200.0;
    scenario.num_servers = 2;
    scenario.language = Language::Java;
    scenario.base_request_rate = 10.0;
    scenario.traffic_pattern = TrafficPattern::Bursty;
    scenario.traffic.burst_size_mean = 8.0;
    scenario.traffic.burst_interval = 3.0;
    scenario.balancing_strategy = BalancingStrategy::LeastConnections;
    vec![scenario]
}

fn comparison_base(name: String, seed: u64) -> Scenario {
    let mut scenario = seeded(name, seed);
    scenario.duration = 600.0;
    scenario.num_servers = 2;
    scenario.base_request_rate = 20.0;
    scenario.traffic_pattern = TrafficPattern::Poisson;
    scenario.balancing_strategy = BalancingStrategy::LeastConnections;
    scenario
}

fn language_comparison() -> Vec<Scenario> {
    [
        Language::Python,
        Language::Nodejs,
        Language::Java,
        Language::Go,
        Language::Rust,
    ]
    .into_iter()
    .zip(PRESET_SEED..)
    .map(|(language, seed)| {
        let mut scenario = comparison_base(format!("language_comparison_{}", language), seed);
        scenario.language = language;
        scenario
    })
    .collect()
}

fn hardware_comparison() -> Vec<Scenario> {
    HardwareProfile::ALL
        .into_iter()
        .zip(PRESET_SEED..)
        .map(|(profile, seed)| {
            let mut scenario = comparison_base(format!("hardware_comparison_{}", profile), seed);
            scenario.hardware = HardwareSpec::Profile(profile);
            scenario.language = Language::Nodejs;
            scenario
        })
        .collect()
}
