use std::path::PathBuf;
use std::time::Duration;

use crate::error::config::ConfigError;
use crate::service::depletion::ConsumptionRates;

/// Default hourly Magmatic Gas consumption of a running Metenox moon drill.
///
/// Historical deployments disagreed on this figure (55 vs 150 units/hour);
/// it tracks live game mechanics, so it is configuration with a default
/// rather than a hard-coded literal.
const DEFAULT_GAS_RATE_PER_HOUR: f64 = 150.0;

/// Default hourly fuel block consumption of a running Metenox moon drill.
const DEFAULT_FUEL_RATE_PER_HOUR: f64 = 5.0;

const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 300;
const DEFAULT_ALERT_INTERVAL_SECONDS: u64 = 3600;

pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub data_dir: PathBuf,
    pub rates: ConsumptionRates,
    /// How often the proactive token refresh loop ticks.
    pub refresh_interval: Duration,
    /// How often the alert evaluation loop ticks.
    pub alert_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: required("MOONWATCH_CLIENT_ID")?,
            client_secret: required("MOONWATCH_CLIENT_SECRET")?,
            user_agent: optional("MOONWATCH_USER_AGENT")
                .unwrap_or_else(|| "moonwatch/0.1 (+https://github.com/autumn-order/moonwatch)".to_string()),
            data_dir: PathBuf::from(optional("MOONWATCH_DATA_DIR").unwrap_or_else(|| "data".to_string())),
            rates: ConsumptionRates {
                magmatic_gas_per_hour: parsed("MOONWATCH_GAS_RATE_PER_HOUR", DEFAULT_GAS_RATE_PER_HOUR)?,
                fuel_blocks_per_hour: parsed("MOONWATCH_FUEL_RATE_PER_HOUR", DEFAULT_FUEL_RATE_PER_HOUR)?,
            },
            refresh_interval: Duration::from_secs(parsed(
                "MOONWATCH_REFRESH_INTERVAL_SECONDS",
                DEFAULT_REFRESH_INTERVAL_SECONDS,
            )?),
            alert_interval: Duration::from_secs(parsed(
                "MOONWATCH_ALERT_INTERVAL_SECONDS",
                DEFAULT_ALERT_INTERVAL_SECONDS,
            )?),
        })
    }
}

fn required(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn parsed<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: format!("{e}"),
        }),
        Err(_) => Ok(default),
    }
}
