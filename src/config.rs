use std::env;
use std::str::FromStr;

use crate::eoq::{EoqParams, DEFAULT_HOLDING_RATE_PCT, DEFAULT_ORDERING_COST};
use crate::importers::ImportLimits;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_upload_rows: usize,
    pub max_upload_columns: usize,
    pub max_upload_bytes: usize,
    pub default_ordering_cost: f64,
    pub default_holding_rate_pct: f64,
}

impl Default for Config {
    fn default() -> Self {
        let limits = ImportLimits::default();
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            max_upload_rows: limits.max_rows,
            max_upload_columns: limits.max_columns,
            max_upload_bytes: 25 * 1024 * 1024,
            default_ordering_cost: DEFAULT_ORDERING_COST,
            default_holding_rate_pct: DEFAULT_HOLDING_RATE_PCT,
        }
    }
}

/// Read and parse an environment variable, falling back to `default` if unset or invalid
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            max_upload_rows: env_or("MAX_UPLOAD_ROWS", defaults.max_upload_rows),
            max_upload_columns: env_or("MAX_UPLOAD_COLUMNS", defaults.max_upload_columns),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            default_ordering_cost: env_or("DEFAULT_ORDERING_COST", defaults.default_ordering_cost),
            default_holding_rate_pct: env_or(
                "DEFAULT_HOLDING_RATE_PCT",
                defaults.default_holding_rate_pct,
            ),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn import_limits(&self) -> ImportLimits {
        ImportLimits {
            max_rows: self.max_upload_rows,
            max_columns: self.max_upload_columns,
        }
    }

    /// Parameters used when a request does not supply its own
    pub fn default_params(&self) -> EoqParams {
        EoqParams {
            ordering_cost: self.default_ordering_cost,
            holding_rate_pct: self.default_holding_rate_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.import_limits(), ImportLimits::default());
        assert_eq!(config.default_params(), EoqParams::default());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("INVENTORY_TEST_BAD_PORT", "not-a-port");
        assert_eq!(env_or("INVENTORY_TEST_BAD_PORT", 8080u16), 8080);
        env::set_var("INVENTORY_TEST_GOOD_PORT", " 9090 ");
        assert_eq!(env_or("INVENTORY_TEST_GOOD_PORT", 8080u16), 9090);
        assert_eq!(env_or("INVENTORY_TEST_UNSET_PORT", 1u16), 1);
    }
}
