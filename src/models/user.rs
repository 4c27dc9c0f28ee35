//! User: account identity. Email uniqueness is checked by the facade, not here.

use crate::models::base::{expect_bool, expect_str, Entity, EntityKind, EntityMeta};
use crate::models::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const NAME_MAX: usize = 50;

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    meta: EntityMeta,
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    is_admin: bool,
    /// Owned places, filled in by the facade from storage.
    #[serde(skip)]
    places: Vec<Uuid>,
}

impl User {
    pub fn new(input: NewUser) -> Result<Self, ValidationError> {
        validate_first_name(&input.first_name)?;
        validate_last_name(&input.last_name)?;
        validation::email("email", &input.email)?;
        Ok(User {
            meta: EntityMeta::new(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            is_admin: input.is_admin,
            places: Vec::new(),
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn places(&self) -> &[Uuid] {
        &self.places
    }

    pub(crate) fn with_places(mut self, places: Vec<Uuid>) -> Self {
        self.places = places;
        self
    }
}

fn validate_first_name(value: &str) -> Result<(), ValidationError> {
    validation::bounded_text("first_name", "First name", value, NAME_MAX)
}

fn validate_last_name(value: &str) -> Result<(), ValidationError> {
    validation::bounded_text("last_name", "Last name", value, NAME_MAX)
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), ValidationError> {
        match key {
            "first_name" => {
                let v = expect_str("first_name", value)?;
                validate_first_name(v)?;
                self.first_name = v.to_string();
            }
            "last_name" => {
                let v = expect_str("last_name", value)?;
                validate_last_name(v)?;
                self.last_name = v.to_string();
            }
            "email" => {
                let v = expect_str("email", value)?;
                validation::email("email", v)?;
                self.email = v.to_string();
            }
            "is_admin" => {
                self.is_admin = expect_bool("is_admin", value)?;
            }
            _ => {}
        }
        Ok(())
    }
}
