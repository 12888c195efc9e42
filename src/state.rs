use std::sync::Arc;

use crate::config::Config;
use crate::db::{Store, seed};
use crate::services::TokenService;

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: TokenService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        seed::seed_admin(&store, &config).await?;

        let tokens = TokenService::new(config.jwt.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
        })
    }
}
