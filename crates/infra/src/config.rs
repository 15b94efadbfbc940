use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_env: String,
    pub port: u16,
    pub log_level: String,
    /// TTL of the "countries with boundaries" payload, in seconds.
    pub cache_ttl_secs: u64,
    /// Bound on waiting for the in-flight cache computation, in milliseconds.
    pub cache_lock_wait_ms: u64,
    /// Load the bootstrap dataset on startup.
    pub seed_data: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let cfg = config::Config::builder()
            .set_default("app_env", "development")?
            .set_default("port", 3000)?
            .set_default("log_level", "info")?
            .set_default("cache_ttl_secs", 600)?
            .set_default("cache_lock_wait_ms", 5000)?
            .set_default("seed_data", true)?
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        cfg.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}
