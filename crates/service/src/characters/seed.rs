use models::character::CharacterDraft;
use tracing::info;

use crate::errors::ServiceError;

use super::repository::CharacterRepository;

/// The five demo characters the catalog ships with.
pub fn demo_characters() -> Vec<CharacterDraft> {
    [
        ("Goku", "Saiyan", "Earth", "Ultra Instinct", "Kamehameha"),
        ("Vegeta", "Saiyan", "Vegeta", "Super Saiyan Blue Evolution", "Final Flash"),
        ("Piccolo", "Namekian", "Namek", "Orange Piccolo", "Special Beam Cannon"),
        ("Gohan", "Half-Saiyan", "Earth", "Beast", "Masenko"),
        ("Frieza", "Frost Demon", "Unknown", "Black Frieza", "Death Ball"),
    ]
    .into_iter()
    .map(|(name, race, planet, transformation, technique)| CharacterDraft {
        name: name.to_string(),
        race: race.to_string(),
        planet: planet.to_string(),
        transformation: transformation.to_string(),
        technique: technique.to_string(),
        image_url: None,
    })
    .collect()
}

/// Insert the demo characters when the store is empty; returns how many were added.
pub async fn seed_if_empty(repo: &dyn CharacterRepository) -> Result<usize, ServiceError> {
    if !repo.list().await?.is_empty() {
        return Ok(0);
    }
    let drafts = demo_characters();
    let count = drafts.len();
    for draft in drafts {
        repo.insert(draft).await?;
    }
    info!(count, backend = repo.backend_name(), event = "seeded", "demo characters inserted");
    Ok(count)
}
