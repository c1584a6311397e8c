//! Configuration errors

use partner_commission_core::Error as CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to parse configuration YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid {section} configuration: {source}")]
    InvalidTable {
        section: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown earnings profile '{0}'")]
    UnknownProfile(String),

    #[error("Pricing configuration already initialized")]
    AlreadyInitialized,
}

impl ConfigError {
    pub(crate) fn table(section: &'static str) -> impl FnOnce(CoreError) -> Self {
        move |source| Self::InvalidTable { section, source }
    }
}
