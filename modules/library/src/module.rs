use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{openapi, routes};
use crate::config::LibraryConfig;
use crate::domain::ports::PasswordHasher;
use crate::domain::service::Service;
use crate::infra::security::{Argon2Hasher, JwtTokenIssuer, TokenSettings};
use crate::infra::storage::{Migrator, SeaOrmRepositories};

/// The library module: owns the domain service and exposes its REST router.
#[derive(Default)]
pub struct Library {
    // read-mostly; set once by `init`
    service: ArcSwapOption<Service>,
}

impl Clone for Library {
    fn clone(&self) -> Self {
        Self {
            service: ArcSwapOption::new(self.service.load_full()),
        }
    }
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the module's schema migrations (including the system-role seed).
    pub async fn migrate(&self, db: &db::DbHandle) -> anyhow::Result<()> {
        info!("Running library database migrations");
        Migrator::up(&db.sea(), None)
            .await
            .context("library migrations failed")?;
        info!("Library database migrations completed");
        Ok(())
    }

    /// Wire the SeaORM repositories, Argon2 hashing and JWT tokens into the service.
    pub fn init(
        &self,
        conn: DatabaseConnection,
        cfg: &LibraryConfig,
        tokens: &TokenSettings,
    ) -> anyhow::Result<()> {
        self.init_with_hasher(conn, cfg, tokens, Arc::new(Argon2Hasher::default()))
    }

    pub fn init_with_hasher(
        &self,
        conn: DatabaseConnection,
        cfg: &LibraryConfig,
        tokens: &TokenSettings,
        hasher: Arc<dyn PasswordHasher>,
    ) -> anyhow::Result<()> {
        info!("Initializing library module");
        debug!(
            default_page_size = cfg.default_page_size,
            max_page_size = cfg.max_page_size,
            fine_per_day = cfg.fine_per_day,
            "Loaded library config"
        );
        if cfg.max_page_size == 0 || cfg.default_page_size > cfg.max_page_size {
            anyhow::bail!(
                "invalid page sizes: default {} / max {}",
                cfg.default_page_size,
                cfg.max_page_size
            );
        }

        let service = Service::new(
            SeaOrmRepositories::build(conn),
            hasher,
            Arc::new(JwtTokenIssuer::new(tokens)),
            cfg.to_service_config(),
        );
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }

    pub fn service(&self) -> anyhow::Result<Arc<Service>> {
        self.service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("library service not initialized"))
    }

    /// REST routes under `/api`.
    pub fn router(&self) -> anyhow::Result<axum::Router> {
        info!("Registering library REST routes");
        Ok(routes::router(self.service()?))
    }

    pub fn openapi(&self) -> serde_json::Value {
        openapi::document()
    }
}
