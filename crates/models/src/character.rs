use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryOrder, Set, Unchanged};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Longest accepted value for any of the text fields.
pub const MAX_FIELD_LEN: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "characters")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub race: String,
    pub planet: String,
    pub transformation: String,
    pub technique: String,
    pub image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// A validated character without an id: what gets handed to a store on insert/replace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterDraft {
    pub name: String,
    pub race: String,
    pub planet: String,
    pub transformation: String,
    pub technique: String,
    pub image_url: Option<String>,
}

impl CharacterDraft {
    pub fn into_model(self, id: i32) -> Model {
        Model {
            id,
            name: self.name,
            race: self.race,
            planet: self.planet,
            transformation: self.transformation,
            technique: self.technique,
            image_url: self.image_url,
        }
    }
}

impl From<Model> for CharacterDraft {
    fn from(m: Model) -> Self {
        Self {
            name: m.name,
            race: m.race,
            planet: m.planet,
            transformation: m.transformation,
            technique: m.technique,
            image_url: m.image_url,
        }
    }
}

/// Trim and check a required text field; returns the trimmed value.
pub fn validate_text(field: &str, value: &str) -> Result<String, ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ModelError::Validation(format!("{field} is required")));
    }
    if v.chars().count() > MAX_FIELD_LEN {
        return Err(ModelError::Validation(format!(
            "{field} must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(v.to_string())
}

/// Blank image URLs count as "not supplied".
pub fn normalize_image_url(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Insert a new row; the id comes from the table's identity column.
pub async fn create(db: &DatabaseConnection, draft: CharacterDraft) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: NotSet,
        name: Set(draft.name),
        race: Set(draft.race),
        planet: Set(draft.planet),
        transformation: Set(draft.transformation),
        technique: Set(draft.technique),
        image_url: Set(draft.image_url),
    };
    Ok(am.insert(db).await?)
}

/// Overwrite every mutable column of `id` in a single UPDATE.
pub async fn replace(db: &DatabaseConnection, id: i32, draft: CharacterDraft) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: Unchanged(id),
        name: Set(draft.name),
        race: Set(draft.race),
        planet: Set(draft.planet),
        transformation: Set(draft.transformation),
        technique: Set(draft.technique),
        image_url: Set(draft.image_url),
    };
    match am.update(db).await {
        Ok(m) => Ok(m),
        Err(DbErr::RecordNotUpdated) => Err(ModelError::NotFound(format!("character {id}"))),
        Err(e) => Err(e.into()),
    }
}

/// Returns whether a row was removed.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_text_trims_and_rejects_blank() {
        assert_eq!(validate_text("name", "  Goku ").unwrap(), "Goku");
        let err = validate_text("race", "   ").unwrap_err();
        assert!(err.to_string().contains("race is required"));
    }

    #[test]
    fn validate_text_enforces_length() {
        let long = "x".repeat(MAX_FIELD_LEN + 1);
        assert!(validate_text("technique", &long).is_err());
        let exact = "x".repeat(MAX_FIELD_LEN);
        assert!(validate_text("technique", &exact).is_ok());
    }

    #[test]
    fn blank_image_url_is_absent() {
        assert_eq!(normalize_image_url(None), None);
        assert_eq!(normalize_image_url(Some("  ")), None);
        assert_eq!(normalize_image_url(Some(" https://x/y.jpg ")).as_deref(), Some("https://x/y.jpg"));
    }

    #[test]
    fn model_serializes_image_url_camel_case() {
        let m = Model {
            id: 1,
            name: "Goku".into(),
            race: "Saiyan".into(),
            planet: "Earth".into(),
            transformation: "Ultra Instinct".into(),
            technique: "Kamehameha".into(),
            image_url: None,
        };
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["id"], 1);
        assert!(v.get("imageUrl").is_some());
        assert!(v["imageUrl"].is_null());
    }
}
