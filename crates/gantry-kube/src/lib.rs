//! Gantry Kube - schema reconciliation for machine drivers
//!
//! This crate provides:
//! - **Schema Store**: Persist dynamic schemas as custom resources (or in
//!   memory for tests)
//! - **Embedding Reconciler**: Keep the parent schemas consistent with each
//!   driver's active state
//! - **Driver Lifecycle**: React to driver create/update/remove events,
//!   owning the generated sub-schema
//! - **Installer Boundary**: The interface to the external driver
//!   staging/installation mechanism

pub mod error;
pub mod installer;
pub mod lifecycle;
pub mod reconciler;
pub mod store;

pub use error::{KubeError, Result};
pub use installer::{DriverInstaller, InstallerCalls, MockDriverInstaller};
pub use lifecycle::DriverLifecycle;
pub use reconciler::{EmbeddingReconciler, PARENT_SCHEMAS, ParentSchema};
pub use store::{
    DRIVER_NAME_LABEL, KubeSchemaStore, LabelSelector, MANAGED_BY_LABEL, MANAGED_BY_VALUE,
    MockSchemaStore, OperationCounts, SchemaApiConfig, SchemaStore, driver_schema_labels,
    driver_selector,
};
