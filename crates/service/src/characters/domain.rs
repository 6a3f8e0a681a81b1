use models::character::{normalize_image_url, validate_text, CharacterDraft};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// 创建/更新共用的输入模型：不包含 id，由存储层分配
///
/// Missing text fields deserialize as empty strings so that they are reported
/// by `validate` with the field name instead of a generic body error.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub planet: String,
    #[serde(default)]
    pub transformation: String,
    #[serde(default)]
    pub technique: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CharacterInput {
    pub fn new(name: &str, race: &str, planet: &str, transformation: &str, technique: &str) -> Self {
        Self {
            name: name.to_string(),
            race: race.to_string(),
            planet: planet.to_string(),
            transformation: transformation.to_string(),
            technique: technique.to_string(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: &str) -> Self {
        self.image_url = Some(url.to_string());
        self
    }

    /// 统一校验：Create 与 Update 使用同一套规则
    pub fn validate(&self) -> Result<CharacterDraft, ServiceError> {
        Ok(CharacterDraft {
            name: validate_text("name", &self.name)?,
            race: validate_text("race", &self.race)?,
            planet: validate_text("planet", &self.planet)?,
            transformation: validate_text("transformation", &self.transformation)?,
            technique: validate_text("technique", &self.technique)?,
            image_url: normalize_image_url(self.image_url.as_deref()),
        })
    }
}
