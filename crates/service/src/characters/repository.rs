use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use models::character::{self, CharacterDraft};
use models::Character;

use crate::errors::ServiceError;

/// Persistence abstraction for characters. The store owns id assignment.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Short label reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
    /// All characters in insertion order.
    async fn list(&self) -> Result<Vec<Character>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<Character>, ServiceError>;
    /// Store a new character and return it with its assigned id.
    async fn insert(&self, draft: CharacterDraft) -> Result<Character, ServiceError>;
    /// Swap every mutable field of `id` at once; `NotFound` when absent.
    async fn replace(&self, id: i32, draft: CharacterDraft) -> Result<Character, ServiceError>;
    /// Returns whether the character existed.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmCharacterRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCharacterRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl CharacterRepository for SeaOrmCharacterRepository {
    fn backend_name(&self) -> &'static str { "database" }

    async fn list(&self) -> Result<Vec<Character>, ServiceError> {
        Ok(character::list(&self.db).await?)
    }

    async fn get(&self, id: i32) -> Result<Option<Character>, ServiceError> {
        Ok(character::find(&self.db, id).await?)
    }

    async fn insert(&self, draft: CharacterDraft) -> Result<Character, ServiceError> {
        Ok(character::create(&self.db, draft).await?)
    }

    async fn replace(&self, id: i32, draft: CharacterDraft) -> Result<Character, ServiceError> {
        Ok(character::replace(&self.db, id, draft).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(character::delete(&self.db, id).await?)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.db.ping().await.map_err(|e| ServiceError::StoreUnavailable(e.to_string()))
    }
}
