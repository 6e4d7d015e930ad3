use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::BillingConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmBillingRepository;

/// Billing module: owns the database handle and the domain service.
pub struct Billing {
    db: DatabaseConnection,
    service: Arc<Service>,
}

impl Billing {
    pub fn new(db: DatabaseConnection, config: &BillingConfig) -> Self {
        debug!(
            "Loaded billing config: default_page_size={}, max_page_size={}",
            config.default_page_size, config.max_page_size
        );
        let repo = Arc::new(SeaOrmBillingRepository::new(db.clone()));
        let service = Arc::new(Service::new(repo, ServiceConfig::from(config)));
        Self { db, service }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Running billing migrations");
        Migrator::up(&self.db, None)
            .await
            .context("billing migrations failed")
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Mount the REST routes onto `router`.
    pub fn register_rest(&self, router: Router) -> Router {
        routes::register_routes(router, self.service.clone())
    }
}
