//! Translation from driver flags to resource fields
//!
//! A driver advertises its create-time options as a flat flag list. Each flag
//! maps deterministically to one typed resource field; an unrecognized flag
//! shape aborts the whole translation so the store never sees a partial
//! schema.

use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::schema::{Field, FieldType};

/// One configuration flag as enumerated from a driver binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverFlag {
    /// Flag spelling, with or without leading dashes (e.g. `--foo-size`)
    pub name: String,

    /// Raw type tag from the flag description language
    /// (`string`, `bool`, `int`, `stringSlice`)
    pub kind: String,

    /// Help text, unused by the translation
    pub usage: Option<String>,
}

impl DriverFlag {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            usage: None,
        }
    }
}

/// Map one flag to its `(field name, descriptor)` pair
///
/// Field names are the flag spelling lowercased with all dashes removed.
/// Generated fields are creatable, non-updatable and nullable.
pub fn flag_to_field(flag: &DriverFlag) -> Result<(String, Field)> {
    let name = field_name_for(&flag.name);
    if name.is_empty() {
        return Err(CoreError::InvalidFlagName {
            name: flag.name.clone(),
        });
    }

    let field_type = match flag.kind.as_str() {
        "string" => FieldType::String,
        "bool" => FieldType::Boolean,
        "int" => FieldType::Int,
        "stringSlice" => FieldType::StringList,
        other => {
            return Err(CoreError::UnknownFlagKind {
                flag: flag.name.clone(),
                kind: other.to_string(),
            });
        }
    };

    let field = Field {
        create: true,
        update: false,
        nullable: true,
        field_type,
    };
    Ok((name, field))
}

/// Translate a whole flag set, aborting on the first unrecognized flag
pub fn fields_for_flags(flags: &[DriverFlag]) -> Result<BTreeMap<String, Field>> {
    let mut resource_fields = BTreeMap::new();
    for flag in flags {
        let (name, field) = flag_to_field(flag)?;
        resource_fields.insert(name, field);
    }
    Ok(resource_fields)
}

fn field_name_for(flag_name: &str) -> String {
    flag_name
        .chars()
        .filter(|c| *c != '-')
        .collect::<String>()
        .to_lowercase()
}
