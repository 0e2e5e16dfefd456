//! Naming-convention configuration.
//!
//! Controls how a target name maps to a policy name (`Post` →
//! `PostAuthorization`) and how an action maps to a rule name (`show` →
//! `show?`). Configuration is loaded from environment variables with the
//! conventional defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Naming conventions used by the registry and dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeConfig {
    /// Appended to a target name to form its policy name.
    pub policy_suffix: String,

    /// Appended to an action name to form its rule name.
    pub rule_suffix: String,
}

impl Default for AuthorizeConfig {
    fn default() -> Self {
        Self {
            policy_suffix: "Authorization".to_string(),
            rule_suffix: "?".to_string(),
        }
    }
}

impl AuthorizeConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AUTHORIZE_POLICY_SUFFIX`: policy name suffix (default: `Authorization`)
    /// - `AUTHORIZE_RULE_SUFFIX`: rule name suffix (default: `?`)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            policy_suffix: std::env::var("AUTHORIZE_POLICY_SUFFIX")
                .unwrap_or(default.policy_suffix),
            rule_suffix: std::env::var("AUTHORIZE_RULE_SUFFIX").unwrap_or(default.rule_suffix),
        }
    }

    /// Validate the configuration.
    ///
    /// An empty policy suffix would make every target its own policy name,
    /// so it is rejected along with suffixes containing whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy_suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "policy_suffix".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        for (key, value) in [
            ("policy_suffix", &self.policy_suffix),
            ("rule_suffix", &self.rule_suffix),
        ] {
            if value.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("must not contain whitespace: {value:?}"),
                });
            }
        }

        Ok(())
    }

    /// Policy name for a target name (`Post` → `PostAuthorization`).
    pub fn policy_name_for(&self, target_name: &str) -> String {
        format!("{}{}", target_name, self.policy_suffix)
    }

    /// Rule name for an action name (`show` → `show?`).
    pub fn rule_name_for(&self, action: &str) -> String {
        format!("{}{}", action, self.rule_suffix)
    }
}
