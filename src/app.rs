//! Process bootstrap: open the store, migrate, run the module lifecycle
//! around the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{
    self,
    books::{
        routes::SharedStore,
        store::{InMemoryBookStore, PgBookStore},
    },
};

/// Where book records live for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Volatile store for local development; nothing survives a restart.
    InMemory,
}

/// Build a registry with every module wired to `store`.
pub fn build_registry(store: SharedStore) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

/// Connect to Postgres and apply pending migrations. Returns how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookshelf_db::connect(&settings.database).await?;
    let registry = build_registry(Arc::new(PgBookStore::new(pool.clone())));

    let applied = bookshelf_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    pool.close().await;
    Ok(applied)
}

/// Run the service until a shutdown signal arrives.
///
/// Order: open store, init modules, migrate, start modules, serve, stop
/// modules in reverse.
pub async fn serve(settings: Settings, backend: StoreBackend) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?backend,
        "bookshelf bootstrap starting"
    );

    let (store, pool) = match backend {
        StoreBackend::Postgres => {
            let pool = bookshelf_db::connect(&settings.database).await?;
            let store: SharedStore = Arc::new(PgBookStore::new(pool.clone()));
            (store, Some(pool))
        }
        StoreBackend::InMemory => {
            tracing::warn!("using in-memory store; data will not persist");
            let store: SharedStore = Arc::new(InMemoryBookStore::new());
            (store, None)
        }
    };

    let registry = build_registry(store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;

    if let Some(pool) = &pool {
        let applied = bookshelf_db::run_migrations(pool, &registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "schema up to date");
    }

    registry.start_modules(&ctx).await?;
    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    served
}
