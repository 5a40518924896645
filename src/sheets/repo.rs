use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{NewSheet, Sheet};

/// Per-user sheet storage. Every query is scoped by the owning user.
#[async_trait]
pub trait SheetRepo: Send + Sync {
    async fn add(&self, user_id: Uuid, sheet: NewSheet) -> anyhow::Result<Sheet>;
    /// Oldest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Sheet>>;
    async fn close(&self) {}
}

#[derive(Clone)]
pub struct PgSheetRepo {
    db: PgPool,
}

impl PgSheetRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SheetRepo for PgSheetRepo {
    async fn add(&self, user_id: Uuid, sheet: NewSheet) -> anyhow::Result<Sheet> {
        let row = sqlx::query_as::<_, Sheet>(
            r#"
            INSERT INTO sheets (id, user_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&sheet.title)
        .bind(&sheet.content)
        .fetch_one(&self.db)
        .await
        .context("insert sheet")?;
        Ok(row)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Sheet>> {
        let rows = sqlx::query_as::<_, Sheet>(
            r#"
            SELECT id, user_id, title, content, created_at
            FROM sheets
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list sheets by user")?;
        Ok(rows)
    }

    async fn close(&self) {
        self.db.close().await;
    }
}

/// In-process sheet storage, keyed by owner.
#[derive(Default)]
pub struct MemorySheetRepo {
    sheets: RwLock<HashMap<Uuid, Vec<Sheet>>>,
}

impl MemorySheetRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SheetRepo for MemorySheetRepo {
    async fn add(&self, user_id: Uuid, sheet: NewSheet) -> anyhow::Result<Sheet> {
        let sheet = Sheet {
            id: Uuid::new_v4(),
            user_id,
            title: sheet.title,
            content: sheet.content,
            created_at: OffsetDateTime::now_utc(),
        };
        self.sheets
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(sheet.clone());
        Ok(sheet)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Sheet>> {
        Ok(self
            .sheets
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}
