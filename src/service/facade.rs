//! HbnbFacade: single entry point between HTTP handlers, entities and storage.
//!
//! Cross-entity references are checked here before an entity is built, so a
//! missing reference (`NotFound`) is always distinguishable from a field that
//! failed its own validation (`Validation`).

use crate::error::AppError;
use crate::models::{
    Amenity, Entity, EntityKind, EntityRef, Fields, NewAmenity, NewUser, Place, PlaceDetails, Review, User,
};
use crate::repository::{InMemoryRepository, PgRepository, Repository};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Body of a place creation request.
#[derive(Clone, Debug, Deserialize)]
pub struct PlaceInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: Uuid,
    #[serde(default)]
    pub amenities: Vec<Uuid>,
}

/// Body of a review creation request.
#[derive(Clone, Debug, Deserialize)]
pub struct ReviewInput {
    pub text: String,
    pub rating: i64,
    pub user_id: Uuid,
    pub place_id: Uuid,
}

#[derive(Clone)]
pub struct HbnbFacade {
    users: Arc<dyn Repository<User>>,
    places: Arc<dyn Repository<Place>>,
    reviews: Arc<dyn Repository<Review>>,
    amenities: Arc<dyn Repository<Amenity>>,
}

impl HbnbFacade {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        places: Arc<dyn Repository<Place>>,
        reviews: Arc<dyn Repository<Review>>,
        amenities: Arc<dyn Repository<Amenity>>,
    ) -> Self {
        HbnbFacade {
            users,
            places,
            reviews,
            amenities,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRepository::<User>::new()),
            Arc::new(InMemoryRepository::<Place>::new()),
            Arc::new(InMemoryRepository::<Review>::new()),
            Arc::new(InMemoryRepository::<Amenity>::new()),
        )
    }

    /// Tables must already exist (see [`crate::store::ensure_tables`]).
    pub fn postgres(pool: PgPool, schema: &str) -> Self {
        Self::new(
            Arc::new(PgRepository::<User>::new(pool.clone(), schema)),
            Arc::new(PgRepository::<Place>::new(pool.clone(), schema)),
            Arc::new(PgRepository::<Review>::new(pool.clone(), schema)),
            Arc::new(PgRepository::<Amenity>::new(pool, schema)),
        )
    }

    // ---- users ----

    pub async fn create_user(&self, input: NewUser) -> Result<User, AppError> {
        if self.get_user_by_email(&input.email).await?.is_some() {
            return Err(AppError::DuplicateEmail(input.email));
        }
        let user = self.users.add(User::new(input)?).await?;
        tracing::info!(id = %user.id(), "user created");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        match self.users.get(id).await? {
            Some(user) => Ok(Some(self.with_places(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users.find_one_by("email", &json!(email)).await
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, AppError> {
        self.users.get_all().await
    }

    /// Changing the email to one held by another user fails with `DuplicateEmail`.
    pub async fn update_user(&self, id: Uuid, fields: &Fields) -> Result<Option<User>, AppError> {
        if self.users.get(id).await?.is_none() {
            return Ok(None);
        }
        if let Some(email) = fields.get("email").and_then(Value::as_str) {
            if let Some(other) = self.get_user_by_email(email).await? {
                if other.id() != id {
                    return Err(AppError::DuplicateEmail(email.to_string()));
                }
            }
        }
        match update_entity(self.users.as_ref(), id, fields).await? {
            Some(user) => Ok(Some(self.with_places(user).await?)),
            None => Ok(None),
        }
    }

    /// Blocked while the user still owns places. Reviews written by the user go with it.
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        if self.users.get(id).await?.is_none() {
            return Ok(false);
        }
        let owned = self.places.find_by("owner_id", &json!(id)).await?;
        if !owned.is_empty() {
            tracing::warn!(id = %id, places = owned.len(), "refusing to delete user that owns places");
            return Err(AppError::Conflict(format!(
                "User {} still owns {} place(s)",
                id,
                owned.len()
            )));
        }
        for review in self.reviews.find_by("user_id", &json!(id)).await? {
            self.reviews.delete(review.id()).await?;
        }
        let deleted = self.users.delete(id).await?;
        tracing::info!(id = %id, "user deleted");
        Ok(deleted)
    }

    // ---- amenities ----

    pub async fn create_amenity(&self, input: NewAmenity) -> Result<Amenity, AppError> {
        let amenity = self.amenities.add(Amenity::new(input)?).await?;
        tracing::info!(id = %amenity.id(), "amenity created");
        Ok(amenity)
    }

    pub async fn get_amenity(&self, id: Uuid) -> Result<Option<Amenity>, AppError> {
        self.amenities.get(id).await
    }

    pub async fn get_all_amenities(&self) -> Result<Vec<Amenity>, AppError> {
        self.amenities.get_all().await
    }

    pub async fn update_amenity(&self, id: Uuid, fields: &Fields) -> Result<Option<Amenity>, AppError> {
        update_entity(self.amenities.as_ref(), id, fields).await
    }

    /// Also drops the amenity from every place that lists it.
    pub async fn delete_amenity(&self, id: Uuid) -> Result<bool, AppError> {
        if self.amenities.get(id).await?.is_none() {
            return Ok(false);
        }
        for mut place in self.places.get_all().await? {
            if place.remove_amenity(id) {
                self.places.update(&place).await?;
            }
        }
        let deleted = self.amenities.delete(id).await?;
        tracing::info!(id = %id, "amenity deleted");
        Ok(deleted)
    }

    // ---- places ----

    /// The owner and every listed amenity must exist before the place is built.
    pub async fn create_place(&self, input: PlaceInput) -> Result<Place, AppError> {
        let owner = self
            .users
            .get(input.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::User, input.owner_id))?;
        for amenity_id in &input.amenities {
            if self.amenities.get(*amenity_id).await?.is_none() {
                return Err(AppError::not_found(EntityKind::Amenity, *amenity_id));
            }
        }
        let details = PlaceDetails {
            title: input.title,
            description: input.description,
            price: input.price,
            latitude: input.latitude,
            longitude: input.longitude,
        };
        let place = Place::new(details, EntityRef::of(&owner), input.amenities)?;
        let place = self.places.add(place).await?;
        tracing::info!(id = %place.id(), owner = %owner.id(), "place created");
        Ok(place)
    }

    pub async fn get_place(&self, id: Uuid) -> Result<Option<Place>, AppError> {
        match self.places.get(id).await? {
            Some(place) => Ok(Some(self.with_reviews(place).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_all_places(&self) -> Result<Vec<Place>, AppError> {
        self.places.get_all().await
    }

    pub async fn update_place(&self, id: Uuid, fields: &Fields) -> Result<Option<Place>, AppError> {
        match update_entity(self.places.as_ref(), id, fields).await? {
            Some(place) => Ok(Some(self.with_reviews(place).await?)),
            None => Ok(None),
        }
    }

    /// Reviews of the place are deleted with it.
    pub async fn delete_place(&self, id: Uuid) -> Result<bool, AppError> {
        if self.places.get(id).await?.is_none() {
            return Ok(false);
        }
        for review in self.reviews.find_by("place_id", &json!(id)).await? {
            self.reviews.delete(review.id()).await?;
        }
        let deleted = self.places.delete(id).await?;
        tracing::info!(id = %id, "place deleted");
        Ok(deleted)
    }

    /// `Ok(None)` when the place is missing; a missing amenity is `NotFound`.
    pub async fn add_amenity_to_place(
        &self,
        place_id: Uuid,
        amenity_id: Uuid,
    ) -> Result<Option<Place>, AppError> {
        let Some(mut place) = self.places.get(place_id).await? else {
            return Ok(None);
        };
        let amenity = self
            .amenities
            .get(amenity_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Amenity, amenity_id))?;
        if !place.has_amenity(amenity_id) {
            place.add_amenity(&amenity);
            self.places.update(&place).await?;
        }
        Ok(Some(self.with_reviews(place).await?))
    }

    pub async fn get_places_by_owner(&self, user_id: Uuid) -> Result<Option<Vec<Place>>, AppError> {
        if self.users.get(user_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.places.find_by("owner_id", &json!(user_id)).await?))
    }

    // ---- reviews ----

    /// Author and place must exist before the review is built.
    pub async fn create_review(&self, input: ReviewInput) -> Result<Review, AppError> {
        let user = self
            .users
            .get(input.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::User, input.user_id))?;
        let place = self
            .places
            .get(input.place_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Place, input.place_id))?;
        let review = Review::new(input.text, input.rating, EntityRef::of(&user), EntityRef::of(&place))?;
        let review = self.reviews.add(review).await?;
        tracing::info!(id = %review.id(), place = %place.id(), "review created");
        Ok(review)
    }

    pub async fn get_review(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        self.reviews.get(id).await
    }

    pub async fn get_all_reviews(&self) -> Result<Vec<Review>, AppError> {
        self.reviews.get_all().await
    }

    pub async fn update_review(&self, id: Uuid, fields: &Fields) -> Result<Option<Review>, AppError> {
        update_entity(self.reviews.as_ref(), id, fields).await
    }

    pub async fn delete_review(&self, id: Uuid) -> Result<bool, AppError> {
        let deleted = self.reviews.delete(id).await?;
        if deleted {
            tracing::info!(id = %id, "review deleted");
        }
        Ok(deleted)
    }

    /// `Ok(None)` when the place itself does not exist.
    pub async fn get_reviews_by_place(&self, place_id: Uuid) -> Result<Option<Vec<Review>>, AppError> {
        if self.places.get(place_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.reviews.find_by("place_id", &json!(place_id)).await?))
    }

    pub async fn get_reviews_by_user(&self, user_id: Uuid) -> Result<Option<Vec<Review>>, AppError> {
        if self.users.get(user_id).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.reviews.find_by("user_id", &json!(user_id)).await?))
    }

    // ---- back-references ----

    async fn with_places(&self, user: User) -> Result<User, AppError> {
        let places = self.places.find_by("owner_id", &json!(user.id())).await?;
        Ok(user.with_places(places.iter().map(Entity::id).collect()))
    }

    async fn with_reviews(&self, mut place: Place) -> Result<Place, AppError> {
        for review in self.reviews.find_by("place_id", &json!(place.id())).await? {
            place.add_review(&review);
        }
        Ok(place)
    }
}

/// Load, apply `fields` through the entity's own validation, store. `Ok(None)` when absent.
async fn update_entity<T: Entity>(
    repo: &dyn Repository<T>,
    id: Uuid,
    fields: &Fields,
) -> Result<Option<T>, AppError> {
    let Some(mut entity) = repo.get(id).await? else {
        return Ok(None);
    };
    entity.update(fields)?;
    if !repo.update(&entity).await? {
        return Ok(None);
    }
    Ok(Some(entity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn facade() -> HbnbFacade {
        HbnbFacade::in_memory()
    }

    fn john() -> NewUser {
        NewUser {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            is_admin: false,
        }
    }

    fn place_for(owner: &User) -> PlaceInput {
        PlaceInput {
            title: "Test Place".into(),
            description: Some("Test Description".into()),
            price: 100.0,
            latitude: 50.0,
            longitude: 50.0,
            owner_id: owner.id(),
            amenities: Vec::new(),
        }
    }

    fn review_for(user: &User, place: &Place) -> ReviewInput {
        ReviewInput {
            text: "Great place!".into(),
            rating: 5,
            user_id: user.id(),
            place_id: place.id(),
        }
    }

    fn fields(pairs: &[(&str, Value)]) -> Fields {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn user_place_review_scenario(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        assert!(!user.is_admin());

        let place = facade.create_place(place_for(&user)).await.unwrap();
        assert_eq!(place.owner_id(), user.id());

        facade.create_review(review_for(&user, &place)).await.unwrap();
        let reviews = facade.get_reviews_by_place(place.id()).await.unwrap().unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].text(), "Great place!");

        let loaded = facade.get_place(place.id()).await.unwrap().unwrap();
        assert_eq!(loaded.reviews(), &[reviews[0].id()]);
        let owner = facade.get_user(user.id()).await.unwrap().unwrap();
        assert_eq!(owner.places(), &[place.id()]);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected(facade: HbnbFacade) {
        facade.create_user(john()).await.unwrap();
        let mut again = john();
        again.first_name = "Johnny".into();
        let err = facade.create_user(again).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail(ref e) if e == "john@example.com"));
        assert_eq!(facade.get_all_users().await.unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_check_runs_before_validation(facade: HbnbFacade) {
        facade.create_user(john()).await.unwrap();
        let mut again = john();
        again.first_name = String::new();
        let err = facade.create_user(again).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_email_update_leaves_stored_user(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let err = facade
            .update_user(user.id(), &fields(&[("first_name", json!("Jane")), ("email", json!("not-an-email"))]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let stored = facade.get_user(user.id()).await.unwrap().unwrap();
        assert_eq!(stored.email(), "john@example.com");
        assert_eq!(stored.first_name(), "John");
    }

    #[rstest]
    #[tokio::test]
    async fn email_update_to_taken_address_is_rejected(facade: HbnbFacade) {
        let john = facade.create_user(john()).await.unwrap();
        let mut jane = self::john();
        jane.email = "jane@example.com".into();
        let jane = facade.create_user(jane).await.unwrap();
        let err = facade
            .update_user(jane.id(), &fields(&[("email", json!("john@example.com"))]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail(_)));
        let same = facade
            .update_user(john.id(), &fields(&[("email", json!("john@example.com"))]))
            .await
            .unwrap();
        assert!(same.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_user_update_is_absent_even_with_taken_email(facade: HbnbFacade) {
        facade.create_user(john()).await.unwrap();
        let res = facade
            .update_user(Uuid::new_v4(), &fields(&[("email", json!("john@example.com"))]))
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_ids_are_absent_not_errors(facade: HbnbFacade) {
        let id = Uuid::new_v4();
        assert!(facade.get_user(id).await.unwrap().is_none());
        assert!(facade.get_place(id).await.unwrap().is_none());
        assert!(facade.get_review(id).await.unwrap().is_none());
        assert!(facade.get_amenity(id).await.unwrap().is_none());
        assert!(facade.update_amenity(id, &fields(&[("name", json!("x"))])).await.unwrap().is_none());
        assert!(!facade.delete_review(id).await.unwrap());
        assert!(facade.get_reviews_by_place(id).await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn review_with_missing_user_or_place_is_not_found(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let place = facade.create_place(place_for(&user)).await.unwrap();

        let mut input = review_for(&user, &place);
        input.user_id = Uuid::new_v4();
        assert!(matches!(facade.create_review(input).await, Err(AppError::NotFound(_))));

        let mut input = review_for(&user, &place);
        input.place_id = Uuid::new_v4();
        assert!(matches!(facade.create_review(input).await, Err(AppError::NotFound(_))));

        assert!(facade.get_all_reviews().await.unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_reference_wins_over_invalid_fields(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let place = facade.create_place(place_for(&user)).await.unwrap();
        let mut input = review_for(&user, &place);
        input.place_id = Uuid::new_v4();
        input.rating = 9;
        assert!(matches!(facade.create_review(input).await, Err(AppError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn place_requires_existing_owner_and_amenities(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let mut input = place_for(&user);
        input.owner_id = Uuid::new_v4();
        assert!(matches!(facade.create_place(input).await, Err(AppError::NotFound(_))));

        let mut input = place_for(&user);
        input.amenities = vec![Uuid::new_v4()];
        assert!(matches!(facade.create_place(input).await, Err(AppError::NotFound(_))));

        let wifi = facade.create_amenity(NewAmenity { name: "Wifi".into() }).await.unwrap();
        let mut input = place_for(&user);
        input.amenities = vec![wifi.id()];
        let place = facade.create_place(input).await.unwrap();
        assert_eq!(place.amenities(), &[wifi.id()]);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_amenity_name_is_a_validation_error(facade: HbnbFacade) {
        let err = facade.create_amenity(NewAmenity { name: String::new() }).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn add_amenity_is_idempotent(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let place = facade.create_place(place_for(&user)).await.unwrap();
        let pool = facade.create_amenity(NewAmenity { name: "Pool".into() }).await.unwrap();
        facade.add_amenity_to_place(place.id(), pool.id()).await.unwrap();
        let place = facade.add_amenity_to_place(place.id(), pool.id()).await.unwrap().unwrap();
        assert_eq!(place.amenities(), &[pool.id()]);
        assert!(matches!(
            facade.add_amenity_to_place(place.id(), Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(facade.add_amenity_to_place(Uuid::new_v4(), pool.id()).await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_amenity_unlinks_it(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let wifi = facade.create_amenity(NewAmenity { name: "Wifi".into() }).await.unwrap();
        let mut input = place_for(&user);
        input.amenities = vec![wifi.id()];
        let place = facade.create_place(input).await.unwrap();

        assert!(facade.delete_amenity(wifi.id()).await.unwrap());
        let place = facade.get_place(place.id()).await.unwrap().unwrap();
        assert!(place.amenities().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_place_removes_its_reviews(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let place = facade.create_place(place_for(&user)).await.unwrap();
        let review = facade.create_review(review_for(&user, &place)).await.unwrap();

        assert!(facade.delete_place(place.id()).await.unwrap());
        assert!(facade.get_review(review.id()).await.unwrap().is_none());
        assert!(!facade.delete_place(place.id()).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn owner_cannot_be_deleted_while_owning_places(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let place = facade.create_place(place_for(&user)).await.unwrap();
        assert!(matches!(facade.delete_user(user.id()).await, Err(AppError::Conflict(_))));

        facade.delete_place(place.id()).await.unwrap();
        assert!(facade.delete_user(user.id()).await.unwrap());
        assert!(facade.get_user(user.id()).await.unwrap().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_user_removes_authored_reviews(facade: HbnbFacade) {
        let host = facade.create_user(john()).await.unwrap();
        let place = facade.create_place(place_for(&host)).await.unwrap();
        let mut guest = john();
        guest.email = "guest@example.com".into();
        let guest = facade.create_user(guest).await.unwrap();
        facade.create_review(review_for(&guest, &place)).await.unwrap();

        assert!(facade.delete_user(guest.id()).await.unwrap());
        assert!(facade.get_reviews_by_place(place.id()).await.unwrap().unwrap().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn update_review_revalidates_rating(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        let place = facade.create_place(place_for(&user)).await.unwrap();
        let review = facade.create_review(review_for(&user, &place)).await.unwrap();

        let err = facade
            .update_review(review.id(), &fields(&[("rating", json!(6))]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let updated = facade
            .update_review(review.id(), &fields(&[("rating", json!(3)), ("text", json!("Updated review"))]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.rating(), 3);
        assert_eq!(updated.text(), "Updated review");
        assert_eq!(facade.get_reviews_by_user(user.id()).await.unwrap().unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn places_by_owner(facade: HbnbFacade) {
        let user = facade.create_user(john()).await.unwrap();
        facade.create_place(place_for(&user)).await.unwrap();
        facade.create_place(place_for(&user)).await.unwrap();
        assert_eq!(facade.get_places_by_owner(user.id()).await.unwrap().unwrap().len(), 2);
        assert!(facade.get_places_by_owner(Uuid::new_v4()).await.unwrap().is_none());
    }
}
