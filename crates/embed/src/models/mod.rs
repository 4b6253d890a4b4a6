//! Data models.

mod account;
mod entity;

pub use account::Account;
pub use entity::{Entity, EntityTranslation, TranslatedEntity};
