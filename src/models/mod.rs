//! Domain entities and their field-level validation.

pub mod amenity;
pub mod base;
pub mod place;
pub mod review;
pub mod user;
pub mod validation;

pub use amenity::{Amenity, NewAmenity};
pub use base::{Entity, EntityKind, EntityMeta, EntityRef, Fields};
pub use place::{Place, PlaceDetails};
pub use review::Review;
pub use user::{NewUser, User};
pub use validation::ValidationError;
