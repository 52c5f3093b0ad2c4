use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::dashboard::repo_types::{DashboardRecord, ListQuery, NewRecord, RecordChanges};

/// Persistence for `dashboard_data`. Every query is scoped by `user_id`.
#[async_trait]
pub trait RecordRepo: Send + Sync {
    async fn list_by_user(
        &self,
        user_id: i64,
        query: &ListQuery,
    ) -> anyhow::Result<Vec<DashboardRecord>>;
    async fn find_owned(&self, id: i64, user_id: i64) -> anyhow::Result<Option<DashboardRecord>>;
    async fn insert(&self, user_id: i64, record: &NewRecord) -> anyhow::Result<DashboardRecord>;
    async fn update(
        &self,
        id: i64,
        user_id: i64,
        changes: &RecordChanges,
    ) -> anyhow::Result<Option<DashboardRecord>>;
    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgRecordRepo {
    db: PgPool,
}

impl PgRecordRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Escapes LIKE metacharacters and wraps the needle in `%`.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl RecordRepo for PgRecordRepo {
    async fn list_by_user(
        &self,
        user_id: i64,
        query: &ListQuery,
    ) -> anyhow::Result<Vec<DashboardRecord>> {
        // Column and direction come from closed enums, never from raw input.
        let sql = format!(
            r#"
            SELECT id, user_id, name, email, phone, address, additional_info, created_at
            FROM dashboard_data
            WHERE user_id = $1
              AND ($2::text IS NULL
                   OR name ILIKE $2 OR email ILIKE $2
                   OR phone ILIKE $2 OR address ILIKE $2)
            ORDER BY {} {}, id ASC
            "#,
            query.sort_by.column(),
            query.order.keyword(),
        );

        let rows = sqlx::query_as::<_, DashboardRecord>(&sql)
            .bind(user_id)
            .bind(query.search.as_deref().map(like_pattern))
            .fetch_all(&self.db)
            .await
            .context("list dashboard records")?;
        Ok(rows)
    }

    async fn find_owned(&self, id: i64, user_id: i64) -> anyhow::Result<Option<DashboardRecord>> {
        let row = sqlx::query_as::<_, DashboardRecord>(
            r#"
            SELECT id, user_id, name, email, phone, address, additional_info, created_at
            FROM dashboard_data
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find dashboard record")?;
        Ok(row)
    }

    async fn insert(&self, user_id: i64, record: &NewRecord) -> anyhow::Result<DashboardRecord> {
        let row = sqlx::query_as::<_, DashboardRecord>(
            r#"
            INSERT INTO dashboard_data (user_id, name, email, phone, address, additional_info)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, email, phone, address, additional_info, created_at
            "#,
        )
        .bind(user_id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.address)
        .bind(&record.additional_info)
        .fetch_one(&self.db)
        .await
        .context("insert dashboard record")?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        user_id: i64,
        changes: &RecordChanges,
    ) -> anyhow::Result<Option<DashboardRecord>> {
        let row = sqlx::query_as::<_, DashboardRecord>(
            r#"
            UPDATE dashboard_data
               SET name = $1, email = $2, phone = $3, address = $4
             WHERE id = $5 AND user_id = $6
            RETURNING id, user_id, name, email, phone, address, additional_info, created_at
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.address)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("update dashboard record")?;
        Ok(row)
    }

    async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query(r#"DELETE FROM dashboard_data WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete dashboard record")?;
        Ok(result.rows_affected())
    }
}
