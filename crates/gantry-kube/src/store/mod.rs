//! Schema store boundary
//!
//! The controller consumes an abstract create/get/update/delete/list API over
//! schema objects with label selectors, owner references and optimistic
//! concurrency. Two implementations ship here:
//! - **Kube** (default): schemas are custom resources behind `Api<DynamicObject>`
//! - **Mock**: in-memory store for unit tests, no cluster required

mod crd;
mod mock;

pub use crd::{KubeSchemaStore, SchemaApiConfig};
pub use mock::{MockSchemaStore, OperationCounts};

use async_trait::async_trait;
use std::collections::BTreeMap;

use gantry_core::{DynamicSchema, SchemaId};

use crate::error::Result;

/// Label carrying the owning driver's name on generated sub-schemas
pub const DRIVER_NAME_LABEL: &str = "gantry.io/driver-name";

/// Standard managed-by label applied to all schemas this controller creates
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// Value of the managed-by label
pub const MANAGED_BY_VALUE: &str = "gantry";

/// Store for persisted schema objects
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Fetch a schema by name. `SchemaNotFound` when absent.
    async fn get(&self, id: &SchemaId) -> Result<DynamicSchema>;

    /// Create a new schema. `SchemaAlreadyExists` for a name collision.
    /// The returned object carries the store-assigned resource version.
    async fn create(&self, schema: &DynamicSchema) -> Result<DynamicSchema>;

    /// Update an existing schema. A stale resource version yields `Conflict`;
    /// no retry happens at this layer.
    async fn update(&self, schema: &DynamicSchema) -> Result<DynamicSchema>;

    /// Delete a schema by name
    async fn delete(&self, id: &SchemaId) -> Result<()>;

    /// List schemas matching a label selector
    async fn list(&self, selector: &LabelSelector) -> Result<Vec<DynamicSchema>>;
}

/// Equality-based label selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    requirements: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `key=value` equality requirement
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Check whether a label set satisfies every requirement
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements
            .iter()
            .all(|(k, v)| labels.get(k) == Some(v))
    }

    /// Render as a Kubernetes label selector query (`k1=v1,k2=v2`)
    pub fn to_query(&self) -> String {
        self.requirements
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Labels applied to a driver's generated sub-schemas
pub fn driver_schema_labels(driver_name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
    labels.insert(DRIVER_NAME_LABEL.to_string(), driver_name.to_string());
    labels
}

/// Selector finding every sub-schema belonging to a driver
pub fn driver_selector(driver_name: &str) -> LabelSelector {
    LabelSelector::new().with(DRIVER_NAME_LABEL, driver_name)
}
