use crate::auth::TokenService;
use crate::config::Config;
use crate::engine::Engine;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub engine: Engine,
    pub tokens: TokenService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database and schema
        let store = Store::open(&config.database.url).await?;

        // Uploaded media lands here; ServeDir serves it read-only
        std::fs::create_dir_all(&config.storage.upload_dir)?;

        let engine = Engine::new(store.clone());
        let tokens = TokenService::new(&config.auth);

        Ok(Self {
            store,
            engine,
            tokens,
            config,
        })
    }
}
