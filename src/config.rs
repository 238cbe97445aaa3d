//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::gateway::OutcomeKind;

/// Default `action` field sent with every intake submission.
pub const DEFAULT_ACTION: &str = "start_planning";

/// Runtime configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Intake webhook URL. `None` runs the simulated gateway.
    pub webhook_url: Option<SecretString>,
    /// Optional request timeout for the webhook call.
    pub timeout: Option<Duration>,
    /// How long the simulated gateway waits before resolving.
    pub simulated_delay: Duration,
    /// What the simulated gateway resolves to.
    pub simulated_outcome: OutcomeKind,
    /// Value of the payload's `action` field.
    pub action: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout: None,
            simulated_delay: Duration::from_millis(1500),
            simulated_outcome: OutcomeKind::Success,
            action: DEFAULT_ACTION.to_string(),
        }
    }
}

impl IntakeConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Split out so tests don't
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let webhook_url = lookup("TRIP_INTAKE_WEBHOOK_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|url| {
                if url.starts_with("http://") || url.starts_with("https://") {
                    Ok(SecretString::from(url))
                } else {
                    Err(ConfigError::InvalidValue {
                        key: "TRIP_INTAKE_WEBHOOK_URL".into(),
                        message: "must start with http:// or https://".into(),
                    })
                }
            })
            .transpose()?;

        let timeout = lookup("TRIP_INTAKE_TIMEOUT_SECS")
            .map(|s| parse_u64("TRIP_INTAKE_TIMEOUT_SECS", &s))
            .transpose()?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let simulated_delay = lookup("TRIP_INTAKE_SIMULATED_DELAY_MS")
            .map(|s| parse_u64("TRIP_INTAKE_SIMULATED_DELAY_MS", &s))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(defaults.simulated_delay);

        let simulated_outcome = match lookup("TRIP_INTAKE_SIMULATED_OUTCOME") {
            None => defaults.simulated_outcome,
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "success" => OutcomeKind::Success,
                "failure" => OutcomeKind::Failure,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "TRIP_INTAKE_SIMULATED_OUTCOME".into(),
                        message: format!("expected 'success' or 'failure', got '{other}'"),
                    });
                }
            },
        };

        let action = lookup("TRIP_INTAKE_ACTION")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.action);

        Ok(Self {
            webhook_url,
            timeout,
            simulated_delay,
            simulated_outcome,
            action,
        })
    }
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}' is not a non-negative integer ({e})"),
    })
}
