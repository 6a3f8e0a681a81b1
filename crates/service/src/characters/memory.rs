use async_trait::async_trait;
use tokio::sync::RwLock;

use models::character::CharacterDraft;
use models::Character;

use crate::errors::ServiceError;

use super::repository::CharacterRepository;

/// Process-local store: a `Vec` in insertion order behind a single `RwLock`.
///
/// Id assignment happens under the write lock, so concurrent inserts never
/// observe the same "next" id. `last_id` only grows, so an id freed by a
/// delete is never handed out again.
#[derive(Default)]
pub struct InMemoryCharacterRepository {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    rows: Vec<Character>,
    last_id: i32,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    fn backend_name(&self) -> &'static str { "memory" }

    async fn list(&self) -> Result<Vec<Character>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.clone())
    }

    async fn get(&self, id: i32) -> Result<Option<Character>, ServiceError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, draft: CharacterDraft) -> Result<Character, ServiceError> {
        let mut inner = self.inner.write().await;
        let max_existing = inner.rows.iter().map(|c| c.id).max().unwrap_or(0);
        let id = inner.last_id.max(max_existing) + 1;
        let created = draft.into_model(id);
        inner.rows.push(created.clone());
        inner.last_id = id;
        Ok(created)
    }

    async fn replace(&self, id: i32, draft: CharacterDraft) -> Result<Character, ServiceError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ServiceError::not_found("character"))?;
        *slot = draft.into_model(id);
        Ok(slot.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|c| c.id != id);
        Ok(inner.rows.len() != before)
    }

    async fn ping(&self) -> Result<(), ServiceError> { Ok(()) }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn draft(name: &str) -> CharacterDraft {
        CharacterDraft {
            name: name.into(),
            race: "Saiyan".into(),
            planet: "Earth".into(),
            transformation: "Super Saiyan".into(),
            technique: "Kamehameha".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_follow_insertion_order() -> Result<(), anyhow::Error> {
        let repo = InMemoryCharacterRepository::new();
        let a = repo.insert(draft("Goku")).await?;
        let b = repo.insert(draft("Vegeta")).await?;
        assert_eq!((a.id, b.id), (1, 2));
        let names: Vec<_> = repo.list().await?.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Goku", "Vegeta"]);
        Ok(())
    }

    #[tokio::test]
    async fn deleted_max_id_is_not_reused() -> Result<(), anyhow::Error> {
        let repo = InMemoryCharacterRepository::new();
        repo.insert(draft("Goku")).await?;
        let b = repo.insert(draft("Vegeta")).await?;
        assert!(repo.delete(b.id).await?);
        assert!(!repo.delete(b.id).await?);
        let c = repo.insert(draft("Piccolo")).await?;
        assert_eq!(c.id, 3);
        Ok(())
    }

    #[tokio::test]
    async fn replace_keeps_position_and_id() -> Result<(), anyhow::Error> {
        let repo = InMemoryCharacterRepository::new();
        repo.insert(draft("Goku")).await?;
        repo.insert(draft("Vegeta")).await?;
        repo.insert(draft("Gohan")).await?;

        let mut d = draft("Vegeta");
        d.technique = "Galick Gun".into();
        let updated = repo.replace(2, d).await?;
        assert_eq!(updated.id, 2);

        let all = repo.list().await?;
        assert_eq!(all[1].technique, "Galick Gun");
        assert!(matches!(repo.replace(99, draft("x")).await, Err(ServiceError::NotFound(_))));
        assert_eq!(repo.list().await?, all);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_get_distinct_ids() -> Result<(), anyhow::Error> {
        let repo = Arc::new(InMemoryCharacterRepository::new());
        let mut handles = Vec::new();
        for i in 0..64 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move { repo.insert(draft(&format!("c{i}"))).await }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await??.id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 64);
        assert_eq!(*ids.last().unwrap(), 64);
        Ok(())
    }
}
