use std::sync::Arc;
use std::time::Duration;

use atlas_domain::association::CountryBoundaryService;
use atlas_domain::cache::SingleFlightCache;
use atlas_domain::country::CountryService;
use atlas_domain::upgrade::UpgradeService;
use atlas_infra::config::AppConfig;
use atlas_infra::repositories::InMemoryAtlasStore;
use atlas_infra::seed;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub countries: CountryService,
    pub country_boundaries: CountryBoundaryService,
    pub upgrades: UpgradeService,
    /// Serialized "countries with boundaries" payload behind a single-flight
    /// guard; invalidated after every successful upgrade.
    pub boundaries_payload: Arc<SingleFlightCache<String>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(InMemoryAtlasStore::new());
        if config.seed_data {
            seed::seed(&store)?;
        }
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: Arc<InMemoryAtlasStore>) -> Self {
        let country_boundaries = CountryBoundaryService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        let countries = CountryService::new(store.clone(), country_boundaries.clone());
        let upgrades = UpgradeService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        let boundaries_payload = Arc::new(SingleFlightCache::new(
            Duration::from_secs(config.cache_ttl_secs),
            Duration::from_millis(config.cache_lock_wait_ms),
        ));

        Self {
            config,
            countries,
            country_boundaries,
            upgrades,
            boundaries_payload,
        }
    }
}
