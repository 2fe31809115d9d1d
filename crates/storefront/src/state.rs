use crate::{
    config::myconfig::{Config, StoreBackend},
    di::{DependenciesInject, Repositories},
    repository::{memory::MemoryDatabase, postgres::run_migrations},
    seed::seed_catalog,
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::DynJwtService,
    config::{ConnectionManager, JwtConfig},
    utils::{SystemMetrics, run_metrics_collector},
};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub jwt_config: DynJwtService,
    pub registry: Arc<Mutex<Registry>>,
    pub system_metrics: Arc<SystemMetrics>,
    pub mask_forbidden_orders: bool,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("deps", &self.di_container)
            .field("system_metrics", &self.system_metrics)
            .field("mask_forbidden_orders", &self.mask_forbidden_orders)
            .finish()
    }
}

impl AppState {
    /// Connects the configured store, applies migrations and the optional
    /// seed, then wires every service.
    pub async fn new(config: &Config) -> Result<Self> {
        let repos = match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .context("Missing environment variable: DATABASE_URL")?;

                let pool = ConnectionManager::new_pool(
                    database_url,
                    config.db_min_conn,
                    config.db_max_conn,
                )
                .await
                .context("Failed to connect to database")?;

                if config.run_migrations {
                    run_migrations(&pool)
                        .await
                        .context("Failed to run database migrations")?;
                    info!("✅ Database migrations applied");
                }

                Repositories::postgres(pool, config.checkout.lock_timeout)
            }
            StoreBackend::Memory => {
                info!("Using the in-memory store, data is lost on restart");
                Repositories::memory(MemoryDatabase::new(config.checkout.lock_timeout))
            }
        };

        if config.seed_database {
            seed_catalog(&repos)
                .await
                .context("Failed to seed database")?;
        }

        let jwt_config = Arc::new(JwtConfig::new(&config.jwt_secret)) as DynJwtService;

        let state = Self::from_repositories(repos, config, jwt_config);
        tokio::spawn(run_metrics_collector(state.system_metrics.clone()));

        Ok(state)
    }

    /// Wires services over already-built repositories.
    pub fn from_repositories(
        repos: Repositories,
        config: &Config,
        jwt_config: DynJwtService,
    ) -> Self {
        let mut registry = Registry::default();
        let system_metrics = Arc::new(SystemMetrics::new());

        let di_container = DependenciesInject::new(repos, config.checkout, &mut registry);

        system_metrics.register(&mut registry);

        Self {
            di_container,
            jwt_config,
            registry: Arc::new(Mutex::new(registry)),
            system_metrics,
            mask_forbidden_orders: config.mask_forbidden_orders,
        }
    }
}
