use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid scenario '{name}':\n  - {}", .violations.join("\n  - "))]
    InvalidScenario {
        name: String,
        violations: Vec<String>,
    },
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error("{0}")]
    UnknownPreset(String),
    #[error("scenario '{0}' not found")]
    ScenarioNotFound(String),
    #[error("no scenarios defined in '{0}'")]
    NoScenarios(String),
    #[error("duplicate scenario name '{0}'")]
    DuplicateScenarioName(String),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("failed to render output: {0}")]
    Output(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
