//! Kubernetes-backed schema store
//!
//! This is the default store, persisting schemas as cluster-scoped custom
//! resources behind `Api<DynamicObject>`. The API coordinates are
//! configurable so the controller can be pointed at a differently named CRD.

use async_trait::async_trait;
use kube::Client;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use gantry_core::{DynamicSchema, Field, OwnerReference, SchemaId};

use super::{LabelSelector, SchemaStore};
use crate::error::{KubeError, Result};

/// API coordinates of the dynamic schema resource
#[derive(Debug, Clone)]
pub struct SchemaApiConfig {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl Default for SchemaApiConfig {
    fn default() -> Self {
        Self {
            group: "gantry.io".to_string(),
            version: "v1".to_string(),
            kind: "DynamicSchema".to_string(),
        }
    }
}

impl SchemaApiConfig {
    fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk(&GroupVersionKind::gvk(
            &self.group,
            &self.version,
            &self.kind,
        ))
    }
}

/// Kubernetes schema store
pub struct KubeSchemaStore {
    client: Client,
    resource: ApiResource,
}

impl KubeSchemaStore {
    /// Create a new store, inferring the client from the environment
    pub async fn new(config: SchemaApiConfig) -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::with_client(client, config))
    }

    /// Create with an existing client
    pub fn with_client(client: Client, config: SchemaApiConfig) -> Self {
        Self {
            client,
            resource: config.api_resource(),
        }
    }

    /// Schemas are cluster scoped
    fn api(&self) -> Api<DynamicObject> {
        Api::all_with(self.client.clone(), &self.resource)
    }
}

/// Spec payload of the schema custom resource
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SchemaSpec {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    resource_fields: BTreeMap<String, Field>,
    embed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    embed_type: Option<String>,
}

fn to_object(resource: &ApiResource, schema: &DynamicSchema) -> DynamicObject {
    let mut obj = DynamicObject::new(schema.name.as_str(), resource);

    if !schema.labels.is_empty() {
        obj.metadata.labels = Some(schema.labels.clone());
    }
    if !schema.owner_references.is_empty() {
        obj.metadata.owner_references = Some(
            schema
                .owner_references
                .iter()
                .map(to_k8s_owner)
                .collect(),
        );
    }
    obj.metadata.resource_version = schema.resource_version.clone();

    let spec = SchemaSpec {
        resource_fields: schema.resource_fields.clone(),
        embed: schema.embed,
        embed_type: schema.embed_type.clone(),
    };
    obj.data = json!({ "spec": spec });
    obj
}

fn from_object(obj: DynamicObject) -> Result<DynamicSchema> {
    let name = obj
        .metadata
        .name
        .clone()
        .ok_or_else(|| KubeError::Store("schema object missing metadata.name".to_string()))?;

    let spec: SchemaSpec = match obj.data.get("spec") {
        Some(spec) => serde_json::from_value(spec.clone())
            .map_err(|e| KubeError::Serialization(format!("invalid schema spec: {}", e)))?,
        None => SchemaSpec::default(),
    };

    Ok(DynamicSchema {
        name: SchemaId::new(name),
        resource_fields: spec.resource_fields,
        embed: spec.embed,
        embed_type: spec.embed_type,
        labels: obj.metadata.labels.unwrap_or_default(),
        owner_references: obj
            .metadata
            .owner_references
            .unwrap_or_default()
            .iter()
            .map(from_k8s_owner)
            .collect(),
        resource_version: obj.metadata.resource_version,
    })
}

fn to_k8s_owner(
    owner: &OwnerReference,
) -> k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference {
    k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference {
        api_version: owner.api_version.clone(),
        kind: owner.kind.clone(),
        name: owner.name.clone(),
        uid: owner.uid.clone(),
        ..Default::default()
    }
}

fn from_k8s_owner(
    owner: &k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference,
) -> OwnerReference {
    OwnerReference {
        api_version: owner.api_version.clone(),
        kind: owner.kind.clone(),
        name: owner.name.clone(),
        uid: owner.uid.clone(),
    }
}

#[async_trait]
impl SchemaStore for KubeSchemaStore {
    async fn get(&self, id: &SchemaId) -> Result<DynamicSchema> {
        match self.api().get(id.as_str()).await {
            Ok(obj) => from_object(obj),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(KubeError::SchemaNotFound {
                name: id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, schema: &DynamicSchema) -> Result<DynamicSchema> {
        let mut obj = to_object(&self.resource, schema);
        // the server assigns the initial version
        obj.metadata.resource_version = None;

        match self.api().create(&PostParams::default(), &obj).await {
            Ok(created) => from_object(created),
            Err(kube::Error::Api(e)) if e.code == 409 => Err(KubeError::SchemaAlreadyExists {
                name: schema.name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, schema: &DynamicSchema) -> Result<DynamicSchema> {
        let obj = to_object(&self.resource, schema);

        match self
            .api()
            .replace(schema.name.as_str(), &PostParams::default(), &obj)
            .await
        {
            Ok(replaced) => from_object(replaced),
            Err(kube::Error::Api(e)) if e.code == 409 => Err(KubeError::Conflict {
                name: schema.name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &SchemaId) -> Result<()> {
        match self.api().delete(id.as_str(), &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(KubeError::SchemaNotFound {
                name: id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, selector: &LabelSelector) -> Result<Vec<DynamicSchema>> {
        let mut params = ListParams::default();
        if !selector.is_empty() {
            params = params.labels(&selector.to_query());
        }

        let objects = self.api().list(&params).await?;
        objects.items.into_iter().map(from_object).collect()
    }
}
