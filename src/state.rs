use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::{
    auth::{
        jwt::TokenService,
        repo::{MemoryUserRepo, PgUserRepo, UserRepo},
        services::CredentialStore,
    },
    config::AppConfig,
    sheets::repo::{MemorySheetRepo, PgSheetRepo, SheetRepo},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: CredentialStore,
    pub sheets: Arc<dyn SheetRepo>,
    pub tokens: TokenService,
}

impl AppState {
    /// Connects storage and loads the signing key. Called once at startup.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        if config.jwt.uses_dev_secret() {
            warn!("JWT_SECRET not set; using the insecure development secret");
        }

        let Some(database_url) = config.database_url.clone() else {
            info!("DATABASE_URL not set; using in-memory storage");
            return Ok(Self::in_memory(config));
        };

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        info!("database ready");

        let users = Arc::new(PgUserRepo::new(db.clone())) as Arc<dyn UserRepo>;
        let sheets = Arc::new(PgSheetRepo::new(db)) as Arc<dyn SheetRepo>;
        Ok(Self::from_parts(config, users, sheets))
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            config,
            Arc::new(MemoryUserRepo::new()),
            Arc::new(MemorySheetRepo::new()),
        )
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepo>,
        sheets: Arc<dyn SheetRepo>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt);
        Self {
            config: Arc::new(config),
            credentials: CredentialStore::new(users),
            sheets,
            tokens,
        }
    }

    /// Releases storage connections. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.credentials.close().await;
        self.sheets.close().await;
        info!("storage closed");
    }
}
