use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::names::parse_by_label;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HardwareConfig {
    #[serde(default = "default_cpu_speed")]
    pub cpu_speed: f64,
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: u32,
    #[serde(default = "default_io_latency")]
    pub io_latency: f64,
    #[serde(default = "default_processing_power")]
    pub processing_power: f64,
    #[serde(default = "default_num_cores")]
    pub num_cores: usize,
}

impl HardwareConfig {
    pub fn from_profile(profile: HardwareProfile) -> Self {
        let (cpu_speed, memory_capacity, io_latency, processing_power, num_cores) = match profile
        {
            HardwareProfile::EntryLevel => (2.0, 4, 2.0, 1.5, 4),
            HardwareProfile::Standard => (2.4, 8, 1.0, 5.0, 8),
            HardwareProfile::HighPerformance => (3.5, 16, 0.4, 12.5, 16),
            HardwareProfile::Enterprise => (4.0, 32, 0.2, 30.0, 32),
        };
        Self {
            cpu_speed,
            memory_capacity,
            io_latency,
            processing_power,
            num_cores,
        }
    }

    pub fn estimate_request_time(&self, base_time: f64) -> f64 {
        base_time / self.processing_power + self.io_latency * 0.25
    }
}

fn default_cpu_speed() -> f64 {
    2.4
}

fn default_memory_capacity() -> u32 {
    8
}

fn default_io_latency() -> f64 {
    5.0
}

fn default_processing_power() -> f64 {
    1.0
}

fn default_num_cores() -> usize {
    8
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum HardwareProfile {
    EntryLevel,
    #[default]
    Standard,
    HighPerformance,
    Enterprise,
}

impl HardwareProfile {
    pub const ALL: [HardwareProfile; 4] = [
        HardwareProfile::EntryLevel,
        HardwareProfile::Standard,
        HardwareProfile::HighPerformance,
        HardwareProfile::Enterprise,
    ];
}

parse_by_label!(HardwareProfile, "hardware profile");

impl fmt::Display for HardwareProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HardwareProfile::EntryLevel => "entry_level",
            HardwareProfile::Standard => "standard",
            HardwareProfile::HighPerformance => "high_performance",
            HardwareProfile::Enterprise => "enterprise",
        };
        write!(f, "{}", label)
    }
}

/// Either a named profile or an inline machine description.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum HardwareSpec {
    Profile(HardwareProfile),
    Custom(HardwareConfig),
}

// Strings go through the profile parser so a bad name reports a suggestion
// instead of the generic untagged mismatch.
impl<'de> Deserialize<'de> for HardwareSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Table(HardwareConfig),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) => name
                .parse()
                .map(HardwareSpec::Profile)
                .map_err(de::Error::custom),
            Raw::Table(config) => Ok(HardwareSpec::Custom(config)),
        }
    }
}

impl Default for HardwareSpec {
    fn default() -> Self {
        HardwareSpec::Profile(HardwareProfile::Standard)
    }
}

impl HardwareSpec {
    pub fn resolve(&self) -> HardwareConfig {
        match self {
            HardwareSpec::Profile(profile) => HardwareConfig::from_profile(*profile),
            HardwareSpec::Custom(config) => config.clone(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            HardwareSpec::Profile(profile) => profile.to_string(),
            HardwareSpec::Custom(_) => "custom".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LanguageProfile {
    pub name: String,
    pub efficiency_factor: f64,
    pub memory_overhead: f64,
    pub startup_time: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Language {
    #[default]
    Python,
    Nodejs,
    Java,
    Go,
    Rust,
    Dotnet,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::Nodejs,
        Language::Java,
        Language::Go,
        Language::Rust,
        Language::Dotnet,
    ];

    pub fn profile(self) -> LanguageProfile {
        let (name, efficiency_factor, memory_overhead, startup_time) = match self {
            Language::Python => ("Python", 2.0, 150.0, 450.0),
            Language::Nodejs => ("Node.js", 4.0, 120.0, 300.0),
            Language::Java => ("Java", 8.0, 220.0, 800.0),
            Language::Go => ("Go", 15.0, 70.0, 150.0),
            Language::Rust => ("Rust", 22.0, 50.0, 80.0),
            Language::Dotnet => (".NET", 7.0, 180.0, 600.0),
        };
        LanguageProfile {
            name: name.to_string(),
            efficiency_factor,
            memory_overhead,
            startup_time,
        }
    }
}

parse_by_label!(Language, "language");

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Language::Python => "python",
            Language::Nodejs => "nodejs",
            Language::Java => "java",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Dotnet => "dotnet",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_by_power_and_adds_quarter_io() {
        let hardware = HardwareConfig::from_profile(HardwareProfile::Standard);
        assert_eq!(hardware.estimate_request_time(50.0), 10.25);
    }

    #[test]
    fn custom_hardware_fills_defaults() {
        let spec: HardwareSpec =
            toml::from_str::<Wrapper>("hardware = { cpu_speed = 3.0, memory_capacity = 16, io_latency = 0.5 }")
                .expect("custom hardware should parse")
                .hardware;
        let config = spec.resolve();
        assert_eq!(config.processing_power, 1.0);
        assert_eq!(config.num_cores, 8);
        assert_eq!(spec.label(), "custom");
    }

    #[test]
    fn profile_names_parse_in_snake_case() {
        let spec = toml::from_str::<Wrapper>("hardware = \"high_performance\"")
            .expect("profile should parse")
            .hardware;
        assert_eq!(spec, HardwareSpec::Profile(HardwareProfile::HighPerformance));
        assert_eq!(spec.resolve().num_cores, 16);
    }

    #[test]
    fn empty_custom_table_takes_standard_machine_defaults() {
        let spec = toml::from_str::<Wrapper>("hardware = { processing_power = 4.0 }")
            .expect("partial custom hardware should parse")
            .hardware;
        let config = spec.resolve();
        assert_eq!(config.cpu_speed, 2.4);
        assert_eq!(config.memory_capacity, 8);
        assert_eq!(config.io_latency, 5.0);
        assert_eq!(config.processing_power, 4.0);
        assert_eq!(config.num_cores, 8);

        let spec = serde_json::from_str::<HardwareSpec>("{}").expect("empty table should parse");
        assert_eq!(spec.resolve().io_latency, 5.0);
    }

    #[test]
    fn profile_and_language_names_ignore_case() {
        let spec = toml::from_str::<Wrapper>("hardware = \"STANDARD\"")
            .expect("profile should parse")
            .hardware;
        assert_eq!(spec, HardwareSpec::Profile(HardwareProfile::Standard));
        assert_eq!("NodeJS".parse::<Language>(), Ok(Language::Nodejs));
    }

    #[test]
    fn misspelled_profile_suggests_a_name() {
        let err = match toml::from_str::<Wrapper>("hardware = \"enterprize\"") {
            Ok(_) => panic!("misspelled profile should be rejected"),
            Err(err) => err.to_string(),
        };
        assert!(err.contains("unknown hardware profile 'enterprize', did you mean 'enterprise'?"));

        let err = "pyhton".parse::<Language>().unwrap_err();
        assert_eq!(err, "unknown language 'pyhton', did you mean 'python'?");
    }

    #[test]
    fn custom_hardware_round_trips_through_json() {
        let spec = HardwareSpec::Custom(HardwareConfig::from_profile(HardwareProfile::Enterprise));
        let json = serde_json::to_string(&spec).expect("serialize");
        let back: HardwareSpec = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, spec);
    }

    #[test]
    fn language_profiles_carry_efficiency() {
        assert_eq!(Language::Rust.profile().efficiency_factor, 22.0);
        assert_eq!(Language::Nodejs.profile().name, "Node.js");
    }

    #[derive(Deserialize)]
    struct Wrapper {
        hardware: HardwareSpec,
    }
}
