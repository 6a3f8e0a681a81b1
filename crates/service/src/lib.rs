//! Service layer for the character catalog.
//! - `characters`: store abstraction, its implementations and the CRUD service.
//! - `images`: image resolver abstraction (Dapr blob binding / in-memory).
//! - `settings`: typed access to free-form application settings.

pub mod errors;
pub mod characters;
pub mod images;
pub mod settings;
#[cfg(test)]
pub mod test_support;
