pub mod errors;
pub mod db;
pub mod character;

pub use character::{CharacterDraft, Model as Character};

#[cfg(test)]
mod tests;
