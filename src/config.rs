//! Process configuration read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_pool_size: u32,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub storage_root: String,
    pub public_storage_url: String,
    pub report_offset: FixedOffset,
    pub change_feed_poll: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));
        let or_default = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse("PORT", or_default("PORT", "8080"))?,
            db_pool_size: parse("DB_POOL_SIZE", or_default("DB_POOL_SIZE", "10"))?,
            run_migrations: parse("RUN_MIGRATIONS", or_default("RUN_MIGRATIONS", "true"))?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_audience: or_default("JWT_AUDIENCE", "authenticated"),
            storage_root: or_default("STORAGE_ROOT", "./storage"),
            public_storage_url: or_default("PUBLIC_STORAGE_URL", "http://localhost:8080/storage"),
            report_offset: parse_offset(or_default("REPORT_UTC_OFFSET", "-03:00"))?,
            change_feed_poll: Duration::from_millis(parse(
                "CHANGE_FEED_POLL_MS",
                or_default("CHANGE_FEED_POLL_MS", "1000"),
            )?),
        })
    }
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

/// Parses `+HH:MM` / `-HH:MM`.
fn parse_offset(value: String) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::Invalid {
        var: "REPORT_UTC_OFFSET",
        value: value.clone(),
    };
    let (sign, rest) = match value.trim().split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let cfg = config(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.db_pool_size, 10);
        assert!(cfg.run_migrations);
        assert_eq!(cfg.jwt_audience, "authenticated");
        assert_eq!(cfg.report_offset.local_minus_utc(), -3 * 3600);
        assert_eq!(cfg.change_feed_poll, Duration::from_millis(1000));
    }

    #[test]
    fn missing_required_var_is_named() {
        assert_eq!(
            config(&[("DATABASE_URL", "postgres://db")]).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let base = [("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "s")];
        let err = config(&[base[0], base[1], ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
        let err = config(&[base[0], base[1], ("REPORT_UTC_OFFSET", "03:00")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "REPORT_UTC_OFFSET", .. }));
    }

    #[test]
    fn parses_positive_offsets() {
        assert_eq!(
            parse_offset("+05:30".into()).unwrap().local_minus_utc(),
            5 * 3600 + 30 * 60
        );
    }
}
