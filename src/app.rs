//! Bootstrap shared by the `bookshelf` binary and `bookshelf-cli`.

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::modules::{self, books::repository::BookRepository, users::repository::UserRepository};
use crate::SuggestionEngine;

/// A migrated, initialized application ready to serve or answer queries
pub struct App {
    pub settings: Settings,
    pub pool: SqlitePool,
    pub registry: ModuleRegistry,
}

impl App {
    /// Connect, apply pending migrations and initialize every module.
    pub async fn prepare(settings: Settings) -> anyhow::Result<Self> {
        let pool = bookshelf_db::connect(&settings.database).await?;
        let registry = modules::build_registry(pool.clone(), &settings);

        let applied = bookshelf_db::migrate_registry(&pool, &registry)
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "database schema up to date");

        registry
            .init_all(&InitCtx {
                settings: &settings,
            })
            .await?;

        Ok(Self {
            settings,
            pool,
            registry,
        })
    }

    /// Engine configured the same way the books module configures its own
    pub fn suggestion_engine(&self) -> SuggestionEngine {
        SuggestionEngine::new(
            BookRepository::new(self.pool.clone()),
            UserRepository::new(self.pool.clone()),
            self.settings.catalog.suggestion_limit,
        )
    }

    /// Start the modules, serve HTTP until Ctrl-C, then stop the modules.
    pub async fn serve(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_all(&ctx).await?;

        let served =
            bookshelf_http::start_server(&self.registry, &self.settings, shutdown_signal()).await;

        self.registry.stop_all().await?;
        served
    }

    /// Stop every module without serving (used by one-shot commands).
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_all().await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
