//! Amenity: a named feature a place can offer.

use crate::models::base::{expect_str, Entity, EntityKind, EntityMeta};
use crate::models::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NAME_MAX: usize = 50;

#[derive(Clone, Debug, Deserialize)]
pub struct NewAmenity {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    #[serde(flatten)]
    meta: EntityMeta,
    name: String,
}

impl Amenity {
    pub fn new(input: NewAmenity) -> Result<Self, ValidationError> {
        validate_name(&input.name)?;
        Ok(Amenity {
            meta: EntityMeta::new(),
            name: input.name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    validation::bounded_text("name", "Name", value, NAME_MAX)
}

impl Entity for Amenity {
    const KIND: EntityKind = EntityKind::Amenity;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), ValidationError> {
        if key == "name" {
            let v = expect_str("name", value)?;
            validate_name(v)?;
            self.name = v.to_string();
        }
        Ok(())
    }
}
