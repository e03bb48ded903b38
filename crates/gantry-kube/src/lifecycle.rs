//! Driver lifecycle controller
//!
//! Reacts to driver create/update/remove events, owning the generated
//! sub-schema and its linkage back to the driver. Each event is terminal:
//! either the full sequence completes or the event is reported failed with
//! no intermediate state persisted; retries belong to the surrounding event
//! framework.

use std::sync::Arc;

use gantry_core::{Driver, DynamicSchema, fields_for_flags};

use crate::error::Result;
use crate::installer::DriverInstaller;
use crate::reconciler::EmbeddingReconciler;
use crate::store::{SchemaStore, driver_schema_labels, driver_selector};

/// Controller for machine driver lifecycle events
pub struct DriverLifecycle<S, I> {
    store: Arc<S>,
    installer: I,
    reconciler: EmbeddingReconciler<S>,
}

impl<S: SchemaStore, I: DriverInstaller> DriverLifecycle<S, I> {
    pub fn new(store: Arc<S>, installer: I) -> Self {
        let reconciler = EmbeddingReconciler::new(Arc::clone(&store));
        Self {
            store,
            installer,
            reconciler,
        }
    }

    /// The reconciler backing this controller
    pub fn reconciler(&self) -> &EmbeddingReconciler<S> {
        &self.reconciler
    }

    /// Driver created: install it, project its flags into a sub-schema and
    /// embed the sub-schema on the parent schemas if the driver is active
    pub async fn on_create(&self, driver: &Driver) -> Result<()> {
        self.installer.stage(driver).await?;

        if let Err(e) = self.installer.install(driver).await {
            tracing::error!(
                "failed to download/install driver {}: {}",
                driver.binary_name(),
                e
            );
            return Err(e);
        }

        let flags = self.installer.create_flags(driver.short_name()).await?;
        let resource_fields = fields_for_flags(&flags)?;

        let mut sub_schema = DynamicSchema::new(driver.sub_schema_id());
        sub_schema.resource_fields = resource_fields;
        sub_schema.labels = driver_schema_labels(&driver.name);
        sub_schema.owner_references = vec![driver.owner_reference()];

        match self.store.create(&sub_schema).await {
            Ok(_) => {}
            // a retried create finds its own earlier sub-schema
            Err(e) if e.is_already_exists() => {}
            Err(e) => return Err(e),
        }

        self.reconciler
            .set_embedding(
                &driver.sub_schema_id(),
                &driver.config_field_name(),
                driver.active,
            )
            .await
    }

    /// Driver updated: only the embed state can change. The sub-schema name
    /// is reconstructed by convention; the field set is never re-derived.
    pub async fn on_updated(&self, driver: &Driver) -> Result<()> {
        self.reconciler
            .set_embedding(
                &driver.sub_schema_id(),
                &driver.config_field_name(),
                driver.active,
            )
            .await
    }

    /// Driver removed: delete every sub-schema labeled with the driver's
    /// name, then retract the field from the parent schemas
    pub async fn on_remove(&self, driver: &Driver) -> Result<()> {
        let schemas = self.store.list(&driver_selector(&driver.name)).await?;
        for schema in &schemas {
            tracing::info!("deleting schema {}", schema.name);
            self.store.delete(&schema.name).await?;
            tracing::info!("deleting schema {} done", schema.name);
        }

        self.reconciler
            .set_embedding(&driver.sub_schema_id(), &driver.config_field_name(), false)
            .await
    }
}
