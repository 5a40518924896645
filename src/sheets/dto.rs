use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewSheet, Sheet};

#[derive(Debug, Deserialize)]
pub struct SheetItem {
    pub title: String,
    pub content: String,
}

impl From<SheetItem> for NewSheet {
    fn from(item: SheetItem) -> Self {
        Self {
            title: item.title,
            content: item.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SheetListItem {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Sheet> for SheetListItem {
    fn from(s: Sheet) -> Self {
        Self {
            id: s.id,
            title: s.title,
            content: s.content,
            created_at: s.created_at,
        }
    }
}
