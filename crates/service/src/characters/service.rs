use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, instrument, warn};

use models::character::CharacterDraft;
use models::Character;

use crate::characters::domain::CharacterInput;
use crate::characters::repository::CharacterRepository;
use crate::errors::ServiceError;
use crate::images::{ImageError, ImageResolver};

pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(3);

/// Application service for the character catalog.
///
/// Store failures propagate to the caller. Image resolution is best-effort:
/// failures and timeouts are logged and degrade to an absent URL, and image
/// cleanup after a delete runs detached from the request.
pub struct CharacterService {
    repo: Arc<dyn CharacterRepository>,
    images: Arc<dyn ImageResolver>,
    image_timeout: Duration,
}

impl CharacterService {
    pub fn new(repo: Arc<dyn CharacterRepository>, images: Arc<dyn ImageResolver>) -> Self {
        Self { repo, images, image_timeout: DEFAULT_IMAGE_TIMEOUT }
    }

    pub fn with_image_timeout(mut self, image_timeout: Duration) -> Self {
        self.image_timeout = image_timeout;
        self
    }

    pub fn store_backend(&self) -> &'static str { self.repo.backend_name() }

    pub fn image_backend(&self) -> &'static str { self.images.backend_name() }

    pub async fn list(&self) -> Result<Vec<Character>, ServiceError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i32) -> Result<Character, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("character"))
    }

    /// Create a character; the image URL always comes from the resolver.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::characters::{CharacterInput, CharacterService, InMemoryCharacterRepository};
    /// use service::images::InMemoryImageResolver;
    /// let svc = CharacterService::new(
    ///     Arc::new(InMemoryCharacterRepository::new()),
    ///     Arc::new(InMemoryImageResolver::default()),
    /// );
    /// let input = CharacterInput::new("Goku", "Saiyan", "Earth", "Ultra Instinct", "Kamehameha");
    /// let goku = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(goku.id, 1);
    /// assert!(goku.image_url.unwrap().contains("goku"));
    /// ```
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CharacterInput) -> Result<Character, ServiceError> {
        let mut draft = input.validate()?;
        draft.image_url = self.resolve_image(&draft.name).await;
        let created = self.repo.insert(draft).await?;
        info!(id = created.id, name = %created.name, has_image = created.image_url.is_some(), "character_created");
        Ok(created)
    }

    /// Replace all mutable fields of `id`. An explicit `imageUrl` wins,
    /// otherwise the URL is resolved again from the (possibly new) name.
    #[instrument(skip(self, input), fields(id = id))]
    pub async fn update(&self, id: i32, input: CharacterInput) -> Result<Character, ServiceError> {
        let mut draft = input.validate()?;
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("character"));
        }
        if draft.image_url.is_none() {
            draft.image_url = self.resolve_image(&draft.name).await;
        }
        let updated = self.repo.replace(id, draft).await?;
        info!(id, name = %updated.name, "character_updated");
        Ok(updated)
    }

    /// Remove `id`, then clean up its image in the background.
    #[instrument(skip(self), fields(id = id))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("character"));
        }
        info!(id, name = %existing.name, "character_deleted");
        self.spawn_image_cleanup(existing.name);
        Ok(())
    }

    /// Upload an image for `id` and point the character at it.
    #[instrument(skip(self, bytes), fields(id = id, size = bytes.len()))]
    pub async fn upload_image(&self, id: i32, bytes: Vec<u8>) -> Result<Character, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation("image body is empty".into()));
        }
        let existing = self.get(id).await?;
        let url = match timeout(self.image_timeout, self.images.upload(&existing.name, bytes)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => return Err(ServiceError::ImageUnavailable(e.to_string())),
            Err(_) => {
                return Err(ServiceError::ImageUnavailable(format!(
                    "upload timed out after {}ms",
                    self.image_timeout.as_millis()
                )))
            }
        };
        let mut draft = CharacterDraft::from(existing);
        draft.image_url = Some(url);
        let updated = self.repo.replace(id, draft).await?;
        info!(id, image_url = ?updated.image_url, "character_image_uploaded");
        Ok(updated)
    }

    /// Store reachability for the health endpoint.
    pub async fn health(&self) -> Result<(), ServiceError> {
        self.repo.ping().await
    }

    async fn resolve_image(&self, name: &str) -> Option<String> {
        match timeout(self.image_timeout, self.images.resolve_url(name)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                warn!(character = %name, error = %e, "image resolution failed, continuing without url");
                None
            }
            Err(_) => {
                let timeout_ms = self.image_timeout.as_millis() as u64;
                warn!(character = %name, timeout_ms, "image resolution timed out, continuing without url");
                None
            }
        }
    }

    /// Fire-and-forget: the handle is dropped, failures only reach the logs.
    fn spawn_image_cleanup(&self, name: String) {
        let images = Arc::clone(&self.images);
        let limit = self.image_timeout;
        tokio::spawn(async move {
            let outcome = match timeout(limit, images.delete(&name)).await {
                Ok(res) => res,
                Err(_) => Err(ImageError::Unavailable(format!("delete timed out after {}ms", limit.as_millis()))),
            };
            match outcome {
                Ok(true) => info!(character = %name, event = "image_cleanup", "character image removed"),
                Ok(false) => warn!(character = %name, event = "image_cleanup", "no image removed for character"),
                Err(e) => warn!(character = %name, event = "image_cleanup_failed", error = %e, "failed to clean up character image"),
            }
        });
    }
}
