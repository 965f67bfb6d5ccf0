use crate::{
    config::{RuntimeConfiguration, StoreConfig},
    data::{StudentStore, memory_store::MemoryStore, postgres_store::PostgresStore, seed},
    error::RosterResult,
};
use sqlx::postgres::PgPoolOptions;
use std::{ops::Deref, sync::Arc};

///Opened once at startup and handed to every handler through the router.
#[derive(Clone, Debug)]
pub struct RosterState {
    store: Arc<dyn StudentStore>,
}

impl RosterState {
    pub async fn new(config: &RuntimeConfiguration) -> RosterResult<Self> {
        let store: Arc<dyn StudentStore> = match config.store() {
            StoreConfig::Postgres(db_config) => {
                let options = PgPoolOptions::new().max_connections(db_config.max_connections());
                Arc::new(PostgresStore::connect(options, db_config).await?)
            }
            StoreConfig::Memory => {
                warn!("Using the in-memory store, nothing will survive a restart");
                Arc::new(MemoryStore::default())
            }
        };

        if config.seed_sample_data() {
            seed::seed_if_empty(store.as_ref()).await?;
        }

        Ok(Self { store })
    }

    pub fn with_store(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
        info!("Store closed");
    }
}

impl Deref for RosterState {
    type Target = dyn StudentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}
