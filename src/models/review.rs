//! Review: feedback from one user about one place.

use crate::models::base::{expect_i64, expect_str, Entity, EntityKind, EntityMeta, EntityRef};
use crate::models::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    meta: EntityMeta,
    text: String,
    rating: u8,
    user_id: Uuid,
    place_id: Uuid,
}

impl Review {
    /// Checks run in order: text, rating, user, place. Both references must
    /// point at the right kind of entity; existence is the facade's concern.
    pub fn new(
        text: impl Into<String>,
        rating: i64,
        user: EntityRef,
        place: EntityRef,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        validate_text(&text)?;
        let rating = validate_rating(rating)?;
        let user_id = user.expect_kind(EntityKind::User, "user", "User must be valid instances")?;
        let place_id = place.expect_kind(EntityKind::Place, "place", "Place must be valid instances")?;
        Ok(Review {
            meta: EntityMeta::new(),
            text,
            rating,
            user_id,
            place_id,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn place_id(&self) -> Uuid {
        self.place_id
    }
}

fn validate_text(value: &str) -> Result<(), ValidationError> {
    validation::non_empty("text", "Text", value)
}

fn validate_rating(value: i64) -> Result<u8, ValidationError> {
    if !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err(ValidationError::new("rating", "Rating must be between 1 and 5"));
    }
    u8::try_from(value).map_err(|_| ValidationError::new("rating", "Rating must be between 1 and 5"))
}

impl Entity for Review {
    const KIND: EntityKind = EntityKind::Review;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), ValidationError> {
        match key {
            "text" => {
                let v = expect_str("text", value)?;
                validate_text(v)?;
                self.text = v.to_string();
            }
            "rating" => {
                self.rating = validate_rating(expect_i64("rating", value)?)?;
            }
            _ => {}
        }
        Ok(())
    }
}
