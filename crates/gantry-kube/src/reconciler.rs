//! Embedding reconciler
//!
//! Keeps the two fixed parent schemas consistent with the desired
//! embedded-or-not state of one driver sub-schema. Parent schemas are created
//! on first use, mutated in place afterwards, and never deleted here.

use std::sync::Arc;
use tokio::sync::Mutex;

use gantry_core::{DynamicSchema, Field, FieldType, SchemaId};

use crate::error::Result;
use crate::store::SchemaStore;

/// A parent schema that can host driver configuration fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentSchema {
    /// Schema object name
    pub id: &'static str,
    /// Logical resource type the schema augments
    pub embed_type: &'static str,
}

/// The fixed set of parent schemas maintained by this controller
pub const PARENT_SCHEMAS: [ParentSchema; 2] = [
    ParentSchema {
        id: "machineconfig",
        embed_type: "machine",
    },
    ParentSchema {
        id: "machinetemplateconfig",
        embed_type: "machineTemplate",
    },
];

/// Reconciles embedded driver fields on the parent schemas
///
/// Each parent's read-modify-write is serialized behind its own advisory
/// lock, so concurrent reconciliations (for the same or different drivers)
/// cannot interleave on one parent's field map. The store's own conflict
/// check is the backstop against external writers; conflicts are surfaced,
/// not retried.
pub struct EmbeddingReconciler<S> {
    store: Arc<S>,
    locks: [Mutex<()>; PARENT_SCHEMAS.len()],
}

impl<S: SchemaStore> EmbeddingReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: [Mutex::new(()), Mutex::new(())],
        }
    }

    /// Ensure every parent schema reflects the desired embedded state
    ///
    /// When `embedded` is true each parent gains a `field_name` field typed
    /// as a reference to `sub_schema`; when false the field is removed.
    /// Matching state is a no-op with no store write.
    pub async fn set_embedding(
        &self,
        sub_schema: &SchemaId,
        field_name: &str,
        embedded: bool,
    ) -> Result<()> {
        for (parent, lock) in PARENT_SCHEMAS.iter().zip(self.locks.iter()) {
            let _guard = lock.lock().await;
            self.reconcile_parent(parent, sub_schema, field_name, embedded)
                .await?;
        }
        Ok(())
    }

    async fn reconcile_parent(
        &self,
        parent: &ParentSchema,
        sub_schema: &SchemaId,
        field_name: &str,
        embedded: bool,
    ) -> Result<()> {
        let mut schema = match self.store.get(&SchemaId::new(parent.id)).await {
            Ok(schema) => schema,
            Err(e) if e.is_not_found() => {
                return self
                    .create_parent(parent, sub_schema, field_name, embedded)
                    .await;
            }
            Err(e) => return Err(e),
        };

        let mut should_update = false;
        if embedded {
            if !schema.has_field(field_name) {
                tracing::info!("adding {} to {} schema", field_name, parent.id);
                schema.resource_fields.insert(
                    field_name.to_string(),
                    Field {
                        create: true,
                        update: true,
                        nullable: true,
                        field_type: FieldType::Reference(sub_schema.clone()),
                    },
                );
                should_update = true;
            }
        } else if schema.resource_fields.remove(field_name).is_some() {
            tracing::info!("removing {} from {} schema", field_name, parent.id);
            should_update = true;
        }

        if should_update {
            self.store.update(&schema).await?;
        }
        Ok(())
    }

    async fn create_parent(
        &self,
        parent: &ParentSchema,
        sub_schema: &SchemaId,
        field_name: &str,
        embedded: bool,
    ) -> Result<()> {
        let mut schema = DynamicSchema::new(parent.id);
        schema.embed = true;
        schema.embed_type = Some(parent.embed_type.to_string());
        if embedded {
            // note: unlike the update path above, the field starts
            // non-updatable here
            schema.resource_fields.insert(
                field_name.to_string(),
                Field {
                    create: true,
                    update: false,
                    nullable: true,
                    field_type: FieldType::Reference(sub_schema.clone()),
                },
            );
        }
        self.store.create(&schema).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockSchemaStore;

    fn reconciler(store: &Arc<MockSchemaStore>) -> EmbeddingReconciler<MockSchemaStore> {
        EmbeddingReconciler::new(Arc::clone(store))
    }

    async fn parent(store: &MockSchemaStore, id: &str) -> DynamicSchema {
        store.get(&SchemaId::new(id)).await.unwrap()
    }

    #[tokio::test]
    async fn test_creates_missing_parents_with_field() {
        let store = Arc::new(MockSchemaStore::new());
        let r = reconciler(&store);

        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", true)
            .await
            .unwrap();

        for p in &PARENT_SCHEMAS {
            let schema = parent(&store, p.id).await;
            assert!(schema.embed);
            assert_eq!(schema.embed_type.as_deref(), Some(p.embed_type));

            let field = &schema.resource_fields["fooConfig"];
            assert!(field.create);
            assert!(!field.update);
            assert!(field.nullable);
            assert_eq!(
                field.field_type,
                FieldType::Reference(SchemaId::new("fooconfig"))
            );
        }
    }

    #[tokio::test]
    async fn test_creates_missing_parents_without_field_when_not_embedded() {
        let store = Arc::new(MockSchemaStore::new());
        let r = reconciler(&store);

        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", false)
            .await
            .unwrap();

        for p in &PARENT_SCHEMAS {
            let schema = parent(&store, p.id).await;
            assert!(schema.embed);
            assert!(schema.resource_fields.is_empty());
        }
    }

    #[tokio::test]
    async fn test_adds_field_to_existing_parent_as_updatable() {
        let store = Arc::new(MockSchemaStore::with_schemas(vec![
            DynamicSchema::new("machineconfig"),
            DynamicSchema::new("machinetemplateconfig"),
        ]));
        let r = reconciler(&store);

        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", true)
            .await
            .unwrap();

        for p in &PARENT_SCHEMAS {
            let field = &parent(&store, p.id).await.resource_fields["fooConfig"];
            // existing parents get an updatable field, unlike fresh ones
            assert!(field.update);
        }
    }

    #[tokio::test]
    async fn test_removes_field() {
        let store = Arc::new(MockSchemaStore::new());
        let r = reconciler(&store);

        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", true)
            .await
            .unwrap();
        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", false)
            .await
            .unwrap();

        for p in &PARENT_SCHEMAS {
            assert!(!parent(&store, p.id).await.has_field("fooConfig"));
        }
    }

    #[tokio::test]
    async fn test_matching_state_writes_nothing() {
        let store = Arc::new(MockSchemaStore::new());
        let r = reconciler(&store);

        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", true)
            .await
            .unwrap();
        store.reset_counts();

        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", true)
            .await
            .unwrap();

        let counts = store.operation_counts();
        assert_eq!(counts.creates, 0);
        assert_eq!(counts.updates, 0);

        // same for the retracted state
        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", false)
            .await
            .unwrap();
        store.reset_counts();
        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", false)
            .await
            .unwrap();
        assert_eq!(store.operation_counts().updates, 0);
    }

    #[tokio::test]
    async fn test_concurrent_reconciliations_keep_both_fields() {
        let store = Arc::new(MockSchemaStore::new());
        let r = Arc::new(reconciler(&store));

        let foo = {
            let r = Arc::clone(&r);
            async move {
                r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", true)
                    .await
            }
        };
        let bar = {
            let r = Arc::clone(&r);
            async move {
                r.set_embedding(&SchemaId::new("barconfig"), "barConfig", true)
                    .await
            }
        };

        let (a, b) = futures::join!(foo, bar);
        a.unwrap();
        b.unwrap();

        for p in &PARENT_SCHEMAS {
            let schema = parent(&store, p.id).await;
            assert!(schema.has_field("fooConfig"));
            assert!(schema.has_field("barConfig"));
        }
    }

    #[tokio::test]
    async fn test_other_fields_survive_retraction() {
        let store = Arc::new(MockSchemaStore::new());
        let r = reconciler(&store);

        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", true)
            .await
            .unwrap();
        r.set_embedding(&SchemaId::new("barconfig"), "barConfig", true)
            .await
            .unwrap();
        r.set_embedding(&SchemaId::new("fooconfig"), "fooConfig", false)
            .await
            .unwrap();

        for p in &PARENT_SCHEMAS {
            let schema = parent(&store, p.id).await;
            assert!(!schema.has_field("fooConfig"));
            assert!(schema.has_field("barConfig"));
        }
    }
}
