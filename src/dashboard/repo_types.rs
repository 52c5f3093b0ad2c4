use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// One contact row in `dashboard_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub additional_info: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Validated fields for an insert.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub additional_info: Option<String>,
}

/// Validated fields for an update; `additional_info` is not touched.
#[derive(Debug, Clone)]
pub struct RecordChanges {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Id,
    Name,
    Email,
    Phone,
    Address,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Phone => "phone",
            SortField::Address => "address",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Server-side sort and filter for a listing.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub sort_by: SortField,
    pub order: SortOrder,
    /// Case-insensitive substring over name, email, phone and address.
    pub search: Option<String>,
}
