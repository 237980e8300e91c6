use dotenv;
use std::env;

use db::{ErrorKind, Result};

const DEFAULT_ENVIRONMENT: &str = "development";
const PRODUCTION: &str = "production";

/// Runtime settings, read from the process environment after loading the
/// `.env.<APP_ENV>` file (if any) and then `.env`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub environment: String,
    pub database_url: String,
    pub pool_size: u32,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        let environment = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_owned());
        dotenv::from_filename(format!(".env.{}", environment)).ok();
        dotenv::dotenv().ok();
        Config::from_lookup(environment, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(environment: String, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(ref url) if !url.trim().is_empty() => url.clone(),
            _ => bail!(ErrorKind::MissingDatabaseUrl),
        };

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => bail!(ErrorKind::InvalidPoolSize(raw)),
            },
            None if environment == PRODUCTION => 2,
            None => 10,
        };

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| "info".to_owned());

        Ok(Config {
            environment,
            database_url,
            pool_size,
            log_filter,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup("test".into(), lookup(&[])).expect_err("missing url");
        assert_eq!(err.to_string(), "DATABASE_URL not set");
    }

    #[test]
    fn production_uses_a_small_pool() {
        let config = Config::from_lookup(
            "production".into(),
            lookup(&[("DATABASE_URL", "postgres://prod/news")]),
        ).expect("valid");
        assert!(config.is_production());
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn explicit_pool_size_wins() {
        let config = Config::from_lookup(
            "development".into(),
            lookup(&[("DATABASE_URL", "postgres://localhost/news"), ("DB_POOL_SIZE", "4")]),
        ).expect("valid");
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = Config::from_lookup(
            "development".into(),
            lookup(&[("DATABASE_URL", "postgres://localhost/news"), ("DB_POOL_SIZE", "0")]),
        ).expect_err("invalid");
        assert!(err.to_string().contains("DB_POOL_SIZE"));
    }
}
