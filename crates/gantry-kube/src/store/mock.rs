//! Mock schema store for testing
//!
//! Stores schemas in memory, useful for unit tests without requiring a
//! Kubernetes cluster. Simulates the store's optimistic-concurrency check.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use gantry_core::{DynamicSchema, SchemaId};

use super::{LabelSelector, SchemaStore};
use crate::error::{KubeError, Result};

/// In-memory schema store for testing
#[derive(Clone, Default)]
pub struct MockSchemaStore {
    schemas: Arc<RwLock<BTreeMap<String, DynamicSchema>>>,
    /// Monotonic source for resource versions
    revision: Arc<RwLock<u64>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub gets: usize,
    pub lists: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl MockSchemaStore {
    /// Create a new empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated schemas
    pub fn with_schemas(schemas: Vec<DynamicSchema>) -> Self {
        let store = Self::new();
        {
            let mut map = store.schemas.write().unwrap();
            for mut schema in schemas {
                schema.resource_version = Some(store.next_revision());
                map.insert(schema.name.as_str().to_string(), schema);
            }
        }
        store
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        let mut ops = self.operations.write().unwrap();
        *ops = OperationCounts::default();
    }

    /// Get all stored schemas (for testing)
    pub fn all_schemas(&self) -> Vec<DynamicSchema> {
        self.schemas.read().unwrap().values().cloned().collect()
    }

    /// Count stored schemas
    pub fn schema_count(&self) -> usize {
        self.schemas.read().unwrap().len()
    }

    fn next_revision(&self) -> String {
        let mut revision = self.revision.write().unwrap();
        *revision += 1;
        revision.to_string()
    }
}

#[async_trait]
impl SchemaStore for MockSchemaStore {
    async fn get(&self, id: &SchemaId) -> Result<DynamicSchema> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.gets += 1;
        }

        let schemas = self.schemas.read().unwrap();
        schemas
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| KubeError::SchemaNotFound {
                name: id.to_string(),
            })
    }

    async fn create(&self, schema: &DynamicSchema) -> Result<DynamicSchema> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.creates += 1;
        }

        let mut schemas = self.schemas.write().unwrap();
        if schemas.contains_key(schema.name.as_str()) {
            return Err(KubeError::SchemaAlreadyExists {
                name: schema.name.to_string(),
            });
        }

        let mut stored = schema.clone();
        stored.resource_version = Some(self.next_revision());
        schemas.insert(schema.name.as_str().to_string(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, schema: &DynamicSchema) -> Result<DynamicSchema> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.updates += 1;
        }

        let mut schemas = self.schemas.write().unwrap();
        let current = schemas
            .get(schema.name.as_str())
            .ok_or_else(|| KubeError::SchemaNotFound {
                name: schema.name.to_string(),
            })?;

        // stale token means a concurrent external writer won
        if let Some(version) = &schema.resource_version
            && current.resource_version.as_ref() != Some(version)
        {
            return Err(KubeError::Conflict {
                name: schema.name.to_string(),
            });
        }

        let mut stored = schema.clone();
        stored.resource_version = Some(self.next_revision());
        schemas.insert(schema.name.as_str().to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &SchemaId) -> Result<()> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.deletes += 1;
        }

        let mut schemas = self.schemas.write().unwrap();
        schemas
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| KubeError::SchemaNotFound {
                name: id.to_string(),
            })
    }

    async fn list(&self, selector: &LabelSelector) -> Result<Vec<DynamicSchema>> {
        {
            let mut ops = self.operations.write().unwrap();
            ops.lists += 1;
        }

        let schemas = self.schemas.read().unwrap();
        Ok(schemas
            .values()
            .filter(|s| selector.matches(&s.labels))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DRIVER_NAME_LABEL, driver_schema_labels};

    fn test_schema(name: &str) -> DynamicSchema {
        DynamicSchema::new(name)
    }

    fn labeled_schema(name: &str, driver: &str) -> DynamicSchema {
        let mut schema = DynamicSchema::new(name);
        schema.labels = driver_schema_labels(driver);
        schema
    }

    #[tokio::test]
    async fn test_mock_create_and_get() {
        let store = MockSchemaStore::new();

        let created = store.create(&test_schema("fooconfig")).await.unwrap();
        assert_eq!(created.resource_version, Some("1".to_string()));

        let retrieved = store.get(&SchemaId::new("fooconfig")).await.unwrap();
        assert_eq!(retrieved, created);

        let counts = store.operation_counts();
        assert_eq!(counts.creates, 1);
        assert_eq!(counts.gets, 1);
    }

    #[tokio::test]
    async fn test_mock_create_duplicate_fails() {
        let store = MockSchemaStore::new();

        store.create(&test_schema("fooconfig")).await.unwrap();
        let result = store.create(&test_schema("fooconfig")).await;
        assert!(matches!(result, Err(KubeError::SchemaAlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_mock_get_not_found() {
        let store = MockSchemaStore::new();

        let result = store.get(&SchemaId::new("nonexistent")).await;
        assert!(matches!(result, Err(KubeError::SchemaNotFound { .. })));
    }

    #[tokio::test]
    async fn test_mock_update_bumps_resource_version() {
        let store = MockSchemaStore::new();

        let created = store.create(&test_schema("machineconfig")).await.unwrap();
        let mut modified = created.clone();
        modified.embed = true;

        let updated = store.update(&modified).await.unwrap();
        assert!(updated.embed);
        assert_ne!(updated.resource_version, created.resource_version);
    }

    #[tokio::test]
    async fn test_mock_update_stale_version_conflicts() {
        let store = MockSchemaStore::new();

        let created = store.create(&test_schema("machineconfig")).await.unwrap();

        // concurrent writer bumps the stored version
        let mut other = created.clone();
        other.embed = true;
        store.update(&other).await.unwrap();

        // writing with the original token now conflicts
        let result = store.update(&created).await;
        assert!(matches!(result, Err(KubeError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_mock_update_missing_not_found() {
        let store = MockSchemaStore::new();

        let result = store.update(&test_schema("machineconfig")).await;
        assert!(matches!(result, Err(KubeError::SchemaNotFound { .. })));
    }

    #[tokio::test]
    async fn test_mock_delete() {
        let store = MockSchemaStore::new();

        store.create(&test_schema("fooconfig")).await.unwrap();
        store.delete(&SchemaId::new("fooconfig")).await.unwrap();

        let result = store.get(&SchemaId::new("fooconfig")).await;
        assert!(matches!(result, Err(KubeError::SchemaNotFound { .. })));

        let result = store.delete(&SchemaId::new("fooconfig")).await;
        assert!(matches!(result, Err(KubeError::SchemaNotFound { .. })));
    }

    #[tokio::test]
    async fn test_mock_list_by_label() {
        let store = MockSchemaStore::new();

        store
            .create(&labeled_schema("fooconfig", "foo"))
            .await
            .unwrap();
        store
            .create(&labeled_schema("barconfig", "bar"))
            .await
            .unwrap();
        store.create(&test_schema("machineconfig")).await.unwrap();

        let found = store
            .list(&LabelSelector::new().with(DRIVER_NAME_LABEL, "foo"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, SchemaId::new("fooconfig"));

        let all = store.list(&LabelSelector::new()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_with_schemas() {
        let store = MockSchemaStore::with_schemas(vec![
            test_schema("machineconfig"),
            test_schema("machinetemplateconfig"),
        ]);
        assert_eq!(store.schema_count(), 2);

        let schema = store.get(&SchemaId::new("machineconfig")).await.unwrap();
        assert!(schema.resource_version.is_some());
    }

    #[tokio::test]
    async fn test_operation_counts() {
        let store = MockSchemaStore::new();

        store.create(&test_schema("fooconfig")).await.unwrap();
        let _ = store.get(&SchemaId::new("fooconfig")).await;
        let _ = store.list(&LabelSelector::new()).await;
        let schema = store.get(&SchemaId::new("fooconfig")).await.unwrap();
        store.update(&schema).await.unwrap();
        let _ = store.delete(&SchemaId::new("fooconfig")).await;

        let counts = store.operation_counts();
        assert_eq!(counts.creates, 1);
        assert_eq!(counts.gets, 2);
        assert_eq!(counts.lists, 1);
        assert_eq!(counts.updates, 1);
        assert_eq!(counts.deletes, 1);

        store.reset_counts();
        assert_eq!(store.operation_counts().creates, 0);
    }
}
