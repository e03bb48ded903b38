//! Machine driver record and naming conventions
//!
//! Drivers are created and updated outside this crate; the controller only
//! reacts to them. The naming helpers here are the single home of the
//! conventions linking a driver to its generated schema objects.

use serde::{Deserialize, Serialize};

use crate::schema::{OwnerReference, SchemaId};

/// Prefix of a machine driver binary name
pub const DRIVER_BINARY_PREFIX: &str = "rancher-machine-driver-";

/// Suffix of the generated sub-schema name (`foo` -> `fooconfig`)
pub const SUB_SCHEMA_SUFFIX: &str = "config";

/// Suffix of the embedded field on parent schemas (`foo` -> `fooConfig`)
pub const CONFIG_FIELD_SUFFIX: &str = "Config";

/// API version of the driver resource, used in owner references
pub const DRIVER_API_VERSION: &str = "gantry.io/v1";

/// Kind of the driver resource, used in owner references
pub const DRIVER_KIND: &str = "Driver";

/// An externally supplied machine driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    /// Unique driver name (e.g. `foo` for `rancher-machine-driver-foo`)
    pub name: String,

    /// Store-assigned unique id, carried into owner references
    pub uid: String,

    /// Source location of the driver binary (installable drivers)
    #[serde(default)]
    pub url: String,

    /// Integrity checksum of the driver binary (installable drivers)
    #[serde(default)]
    pub checksum: String,

    /// Built-in drivers ship with the system and are never downloaded
    #[serde(default)]
    pub builtin: bool,

    /// Whether the driver's configuration is exposed on parent schemas
    #[serde(default)]
    pub active: bool,
}

impl Driver {
    /// Name of the driver binary, with the conventional prefix applied
    pub fn binary_name(&self) -> String {
        if self.name.starts_with(DRIVER_BINARY_PREFIX) {
            self.name.clone()
        } else {
            format!("{}{}", DRIVER_BINARY_PREFIX, self.name)
        }
    }

    /// Prefix-stripped name, used to key flag enumeration
    pub fn short_name(&self) -> &str {
        self.name
            .strip_prefix(DRIVER_BINARY_PREFIX)
            .unwrap_or(&self.name)
    }

    /// Conventional name of the generated sub-schema
    pub fn sub_schema_id(&self) -> SchemaId {
        SchemaId::new(format!("{}{}", self.name, SUB_SCHEMA_SUFFIX))
    }

    /// Conventional name of the embedded field on parent schemas
    pub fn config_field_name(&self) -> String {
        format!("{}{}", self.name, CONFIG_FIELD_SUFFIX)
    }

    /// Owner reference linking a generated schema back to this driver
    pub fn owner_reference(&self) -> OwnerReference {
        OwnerReference {
            api_version: DRIVER_API_VERSION.to_string(),
            kind: DRIVER_KIND.to_string(),
            name: self.name.clone(),
            uid: self.uid.clone(),
        }
    }
}
