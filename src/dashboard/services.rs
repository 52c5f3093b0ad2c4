use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    auth::repo::UserRepo,
    dashboard::{
        repo::RecordRepo,
        repo_types::{DashboardRecord, ListQuery, NewRecord, RecordChanges},
    },
    error::{AppError, AppResult},
};

/// Raw contact fields as received; blanks count as missing.
#[derive(Debug, Clone, Default)]
pub struct RecordInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub additional_info: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RecordInput {
    fn into_changes(self) -> AppResult<(RecordChanges, Option<String>)> {
        let (Some(name), Some(email), Some(phone), Some(address)) = (
            present(self.name),
            present(self.email),
            present(self.phone),
            present(self.address),
        ) else {
            return Err(AppError::MissingFields);
        };
        Ok((
            RecordChanges {
                name,
                email,
                phone,
                address,
            },
            present(self.additional_info),
        ))
    }

    fn into_new_record(self) -> AppResult<NewRecord> {
        let (changes, additional_info) = self.into_changes()?;
        Ok(NewRecord {
            name: changes.name,
            email: changes.email,
            phone: changes.phone,
            address: changes.address,
            additional_info,
        })
    }
}

/// Per-user contact records. Ownership is always the caller's `user_id`.
#[derive(Clone)]
pub struct DashboardService {
    users: Arc<dyn UserRepo>,
    records: Arc<dyn RecordRepo>,
}

impl DashboardService {
    pub fn new(users: Arc<dyn UserRepo>, records: Arc<dyn RecordRepo>) -> Self {
        Self { users, records }
    }

    pub async fn list(&self, user_id: i64, query: ListQuery) -> AppResult<Vec<DashboardRecord>> {
        let query = ListQuery {
            search: present(query.search).map(|s| s.to_lowercase()),
            ..query
        };
        let records = self.records.list_by_user(user_id, &query).await?;
        debug!(user_id, count = records.len(), "listed records");
        Ok(records)
    }

    /// Not idempotent: retrying after a lost response inserts a second row.
    pub async fn create(&self, user_id: i64, input: RecordInput) -> AppResult<DashboardRecord> {
        let record = input.into_new_record()?;

        if self.users.find_by_id(user_id).await?.is_none() {
            warn!(user_id, "create record for unknown user");
            return Err(AppError::UserNotFound);
        }

        let created = self.records.insert(user_id, &record).await?;
        info!(user_id, record_id = created.id, "record created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        input: RecordInput,
    ) -> AppResult<DashboardRecord> {
        let (changes, _) = input.into_changes()?;

        if self.records.find_owned(id, user_id).await?.is_none() {
            warn!(user_id, record_id = id, "update of record not owned by user");
            return Err(AppError::NotFoundOrForbidden);
        }

        let updated = self
            .records
            .update(id, user_id, &changes)
            .await?
            .ok_or(AppError::NotFoundOrForbidden)?;
        info!(user_id, record_id = id, "record updated");
        Ok(updated)
    }

    /// Succeeds whether or not a row matched.
    pub async fn delete(&self, id: i64, user_id: i64) -> AppResult<()> {
        let removed = self.records.delete(id, user_id).await?;
        info!(user_id, record_id = id, removed, "record delete");
        Ok(())
    }
}
