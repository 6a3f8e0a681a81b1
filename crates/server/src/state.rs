use std::sync::Arc;

use service::characters::CharacterService;
use service::settings::SettingsService;

/// Shared handler state; built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub characters: Arc<CharacterService>,
    pub settings: Arc<SettingsService>,
}

impl AppState {
    pub fn new(characters: CharacterService, settings: SettingsService) -> Self {
        Self { characters: Arc::new(characters), settings: Arc::new(settings) }
    }
}
