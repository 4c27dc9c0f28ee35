//! Facade over entities and storage.

mod facade;
pub use facade::{HbnbFacade, PlaceInput, ReviewInput};
