use std::env;
use shared::models::VoteOptions;
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub option_a: String,
    pub option_b: String,
    pub postgres_host: String,
    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_db: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Every variable is
    /// mandatory and an empty value counts as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    warn!("Environment variable {key} not found");
                    ConfigError::Missing(key)
                })
        };

        let option_a = var("OPTION_A")?;
        let option_b = var("OPTION_B")?;
        let postgres_host = var("POSTGRES_HOST")?;
        let postgres_user = var("POSTGRES_USER")?;
        let postgres_password = var("POSTGRES_PASSWORD")?;
        let postgres_db = var("POSTGRES_DB")?;
        let port = var("PORT")?;
        let port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;

        Ok(Self {
            option_a,
            option_b,
            postgres_host,
            postgres_user,
            postgres_password,
            postgres_db,
            port,
        })
    }

    pub fn options(&self) -> VoteOptions {
        VoteOptions {
            a: self.option_a.clone(),
            b: self.option_b.clone(),
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.postgres_host)
            .username(&self.postgres_user)
            .password(&self.postgres_password)
            .database(&self.postgres_db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars() -> HashMap<&'static str, String> {
        [
            ("OPTION_A", "Cats"),
            ("OPTION_B", "Dogs"),
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_USER", "postgres"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "votes"),
            ("PORT", "8080"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_loads_all_variables() {
        let config = load(&vars()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.postgres_db, "votes");
        assert_eq!(config.options(), VoteOptions { a: "Cats".into(), b: "Dogs".into() });
    }

    #[test]
    fn test_missing_variable_is_fatal() {
        for key in ["OPTION_A", "OPTION_B", "POSTGRES_HOST", "POSTGRES_USER", "POSTGRES_PASSWORD", "POSTGRES_DB", "PORT"] {
            let mut vars = vars();
            vars.remove(key);
            assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing(key));
        }
    }

    #[test]
    fn test_empty_counts_as_missing() {
        let mut vars = vars();
        vars.insert("OPTION_B", String::new());
        let err = load(&vars).unwrap_err();
        assert_eq!(err.to_string(), "OPTION_B environment variable not set");
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = vars();
        vars.insert("PORT", "eighty".into());
        assert_eq!(load(&vars).unwrap_err(), ConfigError::InvalidPort("eighty".into()));
    }
}
