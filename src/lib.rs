//! Shelf application library
//!
//! Wires the book catalogue module into the kernel registry, the SQLite pool
//! and the HTTP server.

pub mod modules;
pub mod utils;

use anyhow::Context;
use axum::Router;
use shelf_db::Database;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// A booted application: database connected, schemas applied, modules initialized.
pub struct Application {
    settings: Settings,
    database: Database,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect the database, register modules, and prepare their tables.
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let database = Database::connect(&settings.database)
            .await
            .context("failed to open database")?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &database);

        let ctx = InitCtx {
            settings: &settings,
        };
        registry.init_modules(&ctx).await?;

        database
            .apply_schemas(&registry.collect_schemas())
            .await
            .context("failed to apply module schemas")?;

        tracing::info!(
            env = ?settings.environment,
            modules = registry.len(),
            "application built"
        );

        Ok(Self {
            settings,
            database,
            registry,
        })
    }

    /// The fully layered HTTP router, without binding a socket.
    pub fn router(&self) -> Router {
        shelf_http::build_router(&self.registry, &self.settings)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start modules and serve until a shutdown signal, then stop everything.
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_modules(&ctx).await?;

        let served =
            shelf_http::start_server(&self.registry, &self.settings, shelf_http::shutdown_signal())
                .await;

        self.registry.stop_modules().await?;
        self.database.close().await;

        served
    }
}

/// Build the application and serve until shutdown.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    Application::build(settings).await?.run().await
}

/// Create the database and every module table, then exit.
pub async fn init_database(settings: Settings) -> anyhow::Result<()> {
    let app = Application::build(settings).await?;
    app.database().close().await;
    tracing::info!("database initialized");
    Ok(())
}
