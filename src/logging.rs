use tracing_subscriber::EnvFilter;

use config::Config;

/// Installs the global `tracing` subscriber. Returns `false` when one was
/// already installed, which is harmless in tests and embedding hosts.
pub fn init(config: &Config) -> bool {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok();
    if installed {
        info!(environment = %config.environment, "tracing initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let config = Config {
            environment: "test".into(),
            database_url: "postgres://localhost/news_test".into(),
            pool_size: 1,
            log_filter: "not a valid [filter".into(),
        };
        init(&config);
        assert!(!init(&config));
    }
}
