//! Gantry Core - Core types for the machine driver schema controller
//!
//! This crate provides the foundational types used throughout gantry:
//! - `DynamicSchema`: A schema object generated or mutated by the controller
//! - `Field`/`FieldType`: Typed resource field descriptors
//! - `Driver`: The externally supplied machine driver record
//! - `flags`: Translation from a driver's flag set into resource fields

pub mod driver;
pub mod error;
pub mod flags;
pub mod schema;

pub use driver::{
    CONFIG_FIELD_SUFFIX, DRIVER_API_VERSION, DRIVER_BINARY_PREFIX, DRIVER_KIND, Driver,
    SUB_SCHEMA_SUFFIX,
};
pub use error::{CoreError, Result};
pub use flags::{DriverFlag, fields_for_flags, flag_to_field};
pub use schema::{DynamicSchema, Field, FieldType, OwnerReference, SchemaId};
