use async_trait::async_trait;
use axum::Router;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Table definition contributed by a module.
///
/// Statements must be idempotent (`CREATE TABLE IF NOT EXISTS ...`); they are
/// applied on every boot and no applied-version bookkeeping is kept.
#[derive(Debug, Clone)]
pub struct Schema {
    pub id: &'static str,
    pub ddl: &'static str,
}

/// Core module trait that all shelf modules must implement
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Path the module's router is nested under
    fn mount_path(&self) -> String {
        format!("/{}", self.name())
    }

    /// Initialize the module with the provided context
    /// Called during application startup before schemas are applied
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes
    /// Routes will be mounted under [`Module::mount_path`]
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Return OpenAPI specification fragment for this module as JSON
    /// Will be merged with other modules' specs
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Return table definitions this module needs
    fn schemas(&self) -> Vec<Schema> {
        vec![]
    }

    /// Called after schemas are applied, right before the server starts
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources
    /// Called during application shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
