//! Data models
//!
//! Entities the importer creates (content items, users, taxonomy terms and
//! files) and the input types used to create them.

mod entity;
mod file;
mod node;
mod term;
mod user;

pub use entity::{new_uuid, EntityRef, EntityType};
pub use file::{ManagedFile, PUBLIC_SCHEME};
pub use node::{Body, ContentItem, ContentKind, ImageRef, NewContentItem, FULL_HTML};
pub use term::{CreateTermInput, Term, TAGS_VOCABULARY};
pub use user::{CreateUserInput, User};
