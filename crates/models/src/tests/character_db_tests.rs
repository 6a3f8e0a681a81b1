use anyhow::Result;

use crate::character::{self, CharacterDraft};
use crate::db::{connect_sqlite_memory, ensure_schema};
use crate::errors::ModelError;

fn draft(name: &str, technique: &str) -> CharacterDraft {
    CharacterDraft {
        name: name.to_string(),
        race: "Saiyan".to_string(),
        planet: "Earth".to_string(),
        transformation: "Super Saiyan".to_string(),
        technique: technique.to_string(),
        image_url: None,
    }
}

#[tokio::test]
async fn test_character_crud() -> Result<()> {
    let db = connect_sqlite_memory().await?;

    // Create
    let goku = character::create(&db, draft("Goku", "Kamehameha")).await?;
    assert_eq!(goku.id, 1);
    let vegeta = character::create(&db, draft("Vegeta", "Final Flash")).await?;
    assert_eq!(vegeta.id, 2);

    // Read
    let found = character::find(&db, goku.id).await?;
    assert_eq!(found.as_ref(), Some(&goku));
    assert!(character::find(&db, 999).await?.is_none());

    // Replace
    let mut changed = draft("Vegeta", "Galick Gun");
    changed.image_url = Some("https://img/vegeta.jpg".into());
    let updated = character::replace(&db, vegeta.id, changed).await?;
    assert_eq!(updated.id, vegeta.id);
    assert_eq!(updated.technique, "Galick Gun");
    assert_eq!(character::find(&db, vegeta.id).await?.unwrap().image_url.as_deref(), Some("https://img/vegeta.jpg"));

    // Delete
    assert!(character::delete(&db, goku.id).await?);
    assert!(!character::delete(&db, goku.id).await?);
    let all = character::list(&db).await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, vegeta.id);
    Ok(())
}

#[tokio::test]
async fn test_replace_missing_row_is_not_found() -> Result<()> {
    let db = connect_sqlite_memory().await?;
    character::create(&db, draft("Goku", "Kamehameha")).await?;

    let err = character::replace(&db, 42, draft("Nobody", "None")).await.unwrap_err();
    assert!(matches!(err, ModelError::NotFound(_)));

    let all = character::list(&db).await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Goku");
    Ok(())
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() -> Result<()> {
    let db = connect_sqlite_memory().await?;
    let a = character::create(&db, draft("Goku", "Kamehameha")).await?;
    let b = character::create(&db, draft("Gohan", "Masenko")).await?;
    assert!(character::delete(&db, b.id).await?);

    let c = character::create(&db, draft("Piccolo", "Special Beam Cannon")).await?;
    assert!(c.id > b.id);
    assert!(c.id > a.id);
    Ok(())
}

#[tokio::test]
async fn test_list_keeps_insertion_order_and_schema_is_idempotent() -> Result<()> {
    let db = connect_sqlite_memory().await?;
    ensure_schema(&db).await?;
    for name in ["Goku", "Vegeta", "Piccolo"] {
        character::create(&db, draft(name, "Ki Blast")).await?;
    }
    let names: Vec<String> = character::list(&db).await?.into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Goku", "Vegeta", "Piccolo"]);
    Ok(())
}
