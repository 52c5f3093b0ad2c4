//! In-memory repositories for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    auth::{notifier::ResetNotifier, repo::UserRepo, repo_types::User},
    dashboard::{
        repo::RecordRepo,
        repo_types::{DashboardRecord, ListQuery, NewRecord, RecordChanges, SortField, SortOrder},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    records: Vec<DashboardRecord>,
    next_user_id: i64,
    next_record_id: i64,
}

/// Both tables behind one lock, mirroring a single database.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Inserts a user with an unusable password hash.
    pub fn seed_user(&self, email: &str) -> User {
        let mut t = self.tables.lock().unwrap();
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            email: email.to_string(),
            password_hash: "!".into(),
            remember_token: None,
            reset_token: None,
            reset_token_expires: None,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        user
    }

    pub fn record_count(&self) -> usize {
        self.tables.lock().unwrap().records.len()
    }

    fn with_user<F>(&self, id: i64, f: F)
    where
        F: FnOnce(&mut User),
    {
        let mut t = self.tables.lock().unwrap();
        if let Some(user) = t.users.iter_mut().find(|u| u.id == id) {
            f(user);
        }
    }
}

fn find_user<P>(store: &MemoryStore, pred: P) -> Option<User>
where
    P: Fn(&User) -> bool,
{
    let t = store.tables.lock().unwrap();
    t.users.iter().find(|u| pred(u)).cloned()
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(find_user(self, |u| u.id == id))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(find_user(self, |u| u.email == email))
    }

    async fn find_by_remember_token(&self, token: &str) -> anyhow::Result<Option<User>> {
        Ok(find_user(self, |u| u.remember_token.as_deref() == Some(token)))
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        Ok(find_user(self, |u| {
            u.reset_token.as_deref() == Some(token)
                && u.reset_token_expires.is_some_and(|exp| exp > now)
        }))
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            remember_token: None,
            reset_token: None,
            reset_token_expires: None,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(Some(user))
    }

    async fn set_remember_token(&self, id: i64, token: &str) -> anyhow::Result<()> {
        self.with_user(id, |u| u.remember_token = Some(token.to_string()));
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: i64,
        token: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<()> {
        self.with_user(id, |u| {
            u.reset_token = Some(token.to_string());
            u.reset_token_expires = Some(expires);
        });
        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()> {
        self.with_user(id, |u| u.password_hash = password_hash.to_string());
        Ok(())
    }

    async fn complete_password_reset(
        &self,
        id: i64,
        token: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let mut t = self.tables.lock().unwrap();
        let Some(user) = t
            .users
            .iter_mut()
            .find(|u| u.id == id && u.reset_token.as_deref() == Some(token))
        else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        user.reset_token = None;
        user.reset_token_expires = None;
        Ok(true)
    }
}

// Byte order; Postgres sorts text by the database collation, so mixed-case
// names can order differently there.
fn compare(a: &DashboardRecord, b: &DashboardRecord, field: SortField) -> std::cmp::Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
        SortField::Phone => a.phone.cmp(&b.phone),
        SortField::Address => a.address.cmp(&b.address),
    }
}

#[async_trait]
impl RecordRepo for MemoryStore {
    async fn list_by_user(
        &self,
        user_id: i64,
        query: &ListQuery,
    ) -> anyhow::Result<Vec<DashboardRecord>> {
        let t = self.tables.lock().unwrap();
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<DashboardRecord> = t
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| match &needle {
                Some(n) => [&r.name, &r.email, &r.phone, &r.address]
                    .iter()
                    .any(|f| f.to_lowercase().contains(n.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            let ord = match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn find_owned(&self, id: i64, user_id: i64) -> anyhow::Result<Option<DashboardRecord>> {
        let t = self.tables.lock().unwrap();
        Ok(t.records
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, user_id: i64, record: &NewRecord) -> anyhow::Result<DashboardRecord> {
        let mut t = self.tables.lock().unwrap();
        anyhow::ensure!(
            t.users.iter().any(|u| u.id == user_id),
            "foreign key violation: user {user_id}"
        );
        t.next_record_id += 1;
        let row = DashboardRecord {
            id: t.next_record_id,
            user_id,
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            additional_info: record.additional_info.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.records.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        user_id: i64,
        changes: &RecordChanges,
    ) -> anyhow::Result<Option<DashboardRecord>> {
        let mut t = self.tables.lock().unwrap();
        let Some(row) = t
            .records
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
        else {
            return Ok(None);
        };
        row.name = changes.name.clone();
        row.email = changes.email.clone();
        row.phone = changes.phone.clone();
        row.address = changes.address.clone();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64, user_id: i64) -> anyhow::Result<u64> {
        let mut t = self.tables.lock().unwrap();
        let before = t.records.len();
        t.records.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok((before - t.records.len()) as u64)
    }
}

/// Captures reset tokens instead of sending them.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl ResetNotifier for RecordingNotifier {
    async fn send_reset_token(&self, email: &str, token: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}
