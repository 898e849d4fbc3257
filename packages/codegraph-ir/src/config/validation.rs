//! Config validation — enforced before a pipeline run starts (spec §7:
//! "SchemaMismatch... fatal at init; no writes attempted").

use super::Config;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid config: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Cross-field validation for `Config`, matching the teacher's
/// `CrossStageValidator` pattern: every rule is checked and the first
/// failure is surfaced (fail-fast, since config errors are fatal at init).
pub struct ConfigValidator<'a> {
    config: &'a Config,
}

impl<'a> ConfigValidator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.config.thresholds;
        if !(0.0..=1.0).contains(&t.t_exact)
            || !(0.0..=1.0).contains(&t.t_semantic)
            || !(0.0..=1.0).contains(&t.t_structural)
        {
            return Err(ConfigError::new("thresholds must be in [0.0, 1.0]"));
        }
        if !(t.t_exact > t.t_semantic && t.t_semantic > t.t_structural) {
            return Err(ConfigError::new(
                "thresholds must satisfy t_exact > t_semantic > t_structural",
            ));
        }
        if self.config.embedding_dim == 0 {
            return Err(ConfigError::new("embedding_dim must be non-zero"));
        }
        if self.config.batch_size == 0 {
            return Err(ConfigError::new("batch_size must be non-zero"));
        }
        if self.config.max_concurrency == 0 {
            return Err(ConfigError::new("max_concurrency must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.config.max_error_rate) {
            return Err(ConfigError::new("max_error_rate must be in [0.0, 1.0]"));
        }
        if self.config.languages.is_empty() {
            return Err(ConfigError::new("at least one language must be enabled"));
        }
        let rt = &self.config.risk_thresholds;
        if !(rt.critical > rt.high && rt.high > rt.medium) {
            return Err(ConfigError::new(
                "risk_thresholds must satisfy critical > high > medium",
            ));
        }
        Ok(())
    }
}
