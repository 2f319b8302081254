use thiserror::Error;

use crate::entity::Side;

#[derive(Error, Debug)]
pub enum PerceptError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown entity: {side:?} #{unum}")]
    UnknownEntity { side: Side, unum: u8 },

    #[error("Config IO error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Config YAML error: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    #[error("Config JSON error: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("Unsupported config format: {path}")]
    UnsupportedConfigFormat { path: String },
}

impl PerceptError {
    /// Errors raised while loading config files can be retried after fixing the file;
    /// an unknown entity is a caller bug.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            PerceptError::InvalidConfig(_)
                | PerceptError::ConfigIo(_)
                | PerceptError::ConfigYaml(_)
                | PerceptError::ConfigJson(_)
                | PerceptError::UnsupportedConfigFormat { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PerceptError>;
