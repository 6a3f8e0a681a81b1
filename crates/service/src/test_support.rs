#![cfg(test)]
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::characters::{CharacterInput, SeaOrmCharacterRepository};

/// A repository over a private in-memory SQLite database.
pub async fn sqlite_repo() -> Result<Arc<SeaOrmCharacterRepository>, anyhow::Error> {
    let db = models::db::connect_sqlite_memory().await?;
    Ok(Arc::new(SeaOrmCharacterRepository::new(db)))
}

pub fn goku() -> CharacterInput {
    CharacterInput::new("Goku", "Saiyan", "Earth", "Ultra Instinct", "Kamehameha")
}

/// Poll `check` for up to two seconds; used to observe detached background work.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
