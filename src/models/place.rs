//! Place: a rental listing owned by exactly one user.

use crate::models::amenity::Amenity;
use crate::models::base::{expect_f64, expect_str, Entity, EntityKind, EntityMeta, EntityRef};
use crate::models::review::Review;
use crate::models::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const TITLE_MAX: usize = 100;

/// Scalar listing attributes. Relationships are passed to [`Place::new`] separately.
#[derive(Clone, Debug, Deserialize)]
pub struct PlaceDetails {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(flatten)]
    meta: EntityMeta,
    title: String,
    #[serde(default)]
    description: Option<String>,
    price: f64,
    latitude: f64,
    longitude: f64,
    owner_id: Uuid,
    #[serde(default)]
    amenities: Vec<Uuid>,
    /// Filled in by the facade from storage.
    #[serde(skip)]
    reviews: Vec<Uuid>,
}

impl Place {
    /// Checks run in order: title, price, latitude, longitude, owner. Amenity ids
    /// are taken as-is; the facade has already confirmed they exist.
    pub fn new(
        details: PlaceDetails,
        owner: EntityRef,
        amenities: Vec<Uuid>,
    ) -> Result<Self, ValidationError> {
        validate_title(&details.title)?;
        validate_price(details.price)?;
        validate_latitude(details.latitude)?;
        validate_longitude(details.longitude)?;
        let owner_id = check_owner(&owner)?;
        let mut place = Place {
            meta: EntityMeta::new(),
            title: details.title,
            description: details.description,
            price: details.price,
            latitude: details.latitude,
            longitude: details.longitude,
            owner_id,
            amenities: Vec::with_capacity(amenities.len()),
            reviews: Vec::new(),
        };
        for id in amenities {
            place.push_amenity(id);
        }
        Ok(place)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn amenities(&self) -> &[Uuid] {
        &self.amenities
    }

    pub fn reviews(&self) -> &[Uuid] {
        &self.reviews
    }

    pub fn has_amenity(&self, amenity_id: Uuid) -> bool {
        self.amenities.contains(&amenity_id)
    }

    /// Reassign the owner; the reference must point at a user.
    pub fn set_owner(&mut self, owner: EntityRef) -> Result<(), ValidationError> {
        self.owner_id = check_owner(&owner)?;
        self.meta.touch();
        Ok(())
    }

    /// Adds the amenity to the set. The amenity was validated when it was built.
    pub fn add_amenity(&mut self, amenity: &Amenity) {
        if self.push_amenity(amenity.id()) {
            self.meta.touch();
        }
    }

    pub(crate) fn remove_amenity(&mut self, amenity_id: Uuid) -> bool {
        let before = self.amenities.len();
        self.amenities.retain(|id| *id != amenity_id);
        let removed = self.amenities.len() != before;
        if removed {
            self.meta.touch();
        }
        removed
    }

    pub fn add_review(&mut self, review: &Review) {
        self.reviews.push(review.id());
    }

    fn push_amenity(&mut self, id: Uuid) -> bool {
        if self.amenities.contains(&id) {
            return false;
        }
        self.amenities.push(id);
        true
    }
}

fn check_owner(owner: &EntityRef) -> Result<Uuid, ValidationError> {
    owner.expect_kind(EntityKind::User, "owner", "Owner must be a valid User instance")
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    validation::bounded_text("title", "Title", value, TITLE_MAX)
}

fn validate_price(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::new("price", "Price must be a non-negative value"));
    }
    Ok(())
}

fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    validation::in_range("latitude", "Latitude", value, -90.0, 90.0)
}

fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    validation::in_range("longitude", "Longitude", value, -180.0, 180.0)
}

impl Entity for Place {
    const KIND: EntityKind = EntityKind::Place;

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<(), ValidationError> {
        match key {
            "title" => {
                let v = expect_str("title", value)?;
                validate_title(v)?;
                self.title = v.to_string();
            }
            "description" => {
                self.description = if value.is_null() {
                    None
                } else {
                    Some(expect_str("description", value)?.to_string())
                };
            }
            "price" => {
                let v = expect_f64("price", value)?;
                validate_price(v)?;
                self.price = v;
            }
            "latitude" => {
                let v = expect_f64("latitude", value)?;
                validate_latitude(v)?;
                self.latitude = v;
            }
            "longitude" => {
                let v = expect_f64("longitude", value)?;
                validate_longitude(v)?;
                self.longitude = v;
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::amenity::NewAmenity;
    use crate::models::user::{NewUser, User};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn owner() -> User {
        User::new(NewUser {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            is_admin: false,
        })
        .unwrap()
    }

    fn details(latitude: f64, longitude: f64) -> PlaceDetails {
        PlaceDetails {
            title: "Test Place".into(),
            description: Some("Test Description".into()),
            price: 100.0,
            latitude,
            longitude,
        }
    }

    #[rstest]
    fn new_place_links_owner(owner: User) {
        let place = Place::new(details(50.0, 50.0), EntityRef::of(&owner), Vec::new()).unwrap();
        assert_eq!(place.owner_id(), owner.id());
        assert_eq!(place.title(), "Test Place");
        assert!(place.amenities().is_empty());
        assert!(place.reviews().is_empty());
    }

    #[rstest]
    #[case(-90.0, -180.0)]
    #[case(90.0, 180.0)]
    #[case(0.0, 0.0)]
    fn boundary_coordinates_are_accepted(owner: User, #[case] lat: f64, #[case] lon: f64) {
        assert!(Place::new(details(lat, lon), EntityRef::of(&owner), Vec::new()).is_ok());
    }

    #[rstest]
    #[case(-90.5, 0.0, "latitude")]
    #[case(91.0, 0.0, "latitude")]
    #[case(0.0, -180.01, "longitude")]
    #[case(0.0, 181.0, "longitude")]
    #[case(f64::NAN, 0.0, "latitude")]
    fn out_of_range_coordinates_are_rejected(
        owner: User,
        #[case] lat: f64,
        #[case] lon: f64,
        #[case] field: &str,
    ) {
        let err = Place::new(details(lat, lon), EntityRef::of(&owner), Vec::new()).unwrap_err();
        assert_eq!(err.field, field);
    }

    #[rstest]
    fn title_is_checked_before_price(owner: User) {
        let mut d = details(0.0, 0.0);
        d.title = String::new();
        d.price = -1.0;
        let err = Place::new(d, EntityRef::of(&owner), Vec::new()).unwrap_err();
        assert_eq!(err.field, "title");
    }

    #[rstest]
    fn negative_price_is_rejected(owner: User) {
        let mut d = details(0.0, 0.0);
        d.price = -0.01;
        let err = Place::new(d, EntityRef::of(&owner), Vec::new()).unwrap_err();
        assert_eq!(err.message, "Price must be a non-negative value");
    }

    #[rstest]
    fn overlong_title_is_rejected(owner: User) {
        let mut d = details(0.0, 0.0);
        d.title = "t".repeat(TITLE_MAX + 1);
        assert!(Place::new(d, EntityRef::of(&owner), Vec::new()).is_err());
    }

    #[test]
    fn owner_must_be_a_user() {
        let amenity = Amenity::new(NewAmenity { name: "Wifi".into() }).unwrap();
        let err = Place::new(details(0.0, 0.0), EntityRef::of(&amenity), Vec::new()).unwrap_err();
        assert_eq!(err.field, "owner");
        assert_eq!(err.message, "Owner must be a valid User instance");
    }

    #[rstest]
    fn set_owner_rejects_non_user(owner: User) {
        let mut place = Place::new(details(0.0, 0.0), EntityRef::of(&owner), Vec::new()).unwrap();
        let other = Place::new(details(0.0, 0.0), EntityRef::of(&owner), Vec::new()).unwrap();
        assert!(place.set_owner(EntityRef::of(&other)).is_err());
        assert_eq!(place.owner_id(), owner.id());
    }

    #[rstest]
    fn amenities_behave_as_a_set(owner: User) {
        let wifi = Amenity::new(NewAmenity { name: "Wifi".into() }).unwrap();
        let mut place =
            Place::new(details(0.0, 0.0), EntityRef::of(&owner), vec![wifi.id(), wifi.id()]).unwrap();
        assert_eq!(place.amenities(), &[wifi.id()]);
        place.add_amenity(&wifi);
        assert_eq!(place.amenities().len(), 1);
        assert!(place.remove_amenity(wifi.id()));
        assert!(place.amenities().is_empty());
    }

    #[rstest]
    fn update_does_not_touch_owner(owner: User) {
        let mut place = Place::new(details(0.0, 0.0), EntityRef::of(&owner), Vec::new()).unwrap();
        let fields = [
            ("owner_id".to_string(), json!("00000000-0000-4000-8000-000000000000")),
            ("price".to_string(), json!(250)),
            ("description".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();
        place.update(&fields).unwrap();
        assert_eq!(place.owner_id(), owner.id());
        assert_eq!(place.price(), 250.0);
        assert_eq!(place.description(), None);
    }

    #[rstest]
    fn failed_update_is_not_partially_applied(owner: User) {
        let mut place = Place::new(details(10.0, 10.0), EntityRef::of(&owner), Vec::new()).unwrap();
        let before = place.clone();
        let fields = [
            ("title".to_string(), json!("Renamed")),
            ("latitude".to_string(), json!(120)),
        ]
        .into_iter()
        .collect();
        assert!(place.update(&fields).is_err());
        assert_eq!(place, before);
    }
}
