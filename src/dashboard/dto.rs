use serde::{Deserialize, Serialize};

use crate::{
    dashboard::{
        repo_types::{DashboardRecord, ListQuery, SortField, SortOrder},
        services::RecordInput,
    },
    ids::flexible_id,
};

/// `GET /api/dashboard-data` query string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default, deserialize_with = "flexible_id")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub sort_by: Option<SortField>,
    #[serde(default)]
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub q: Option<String>,
}

impl ListParams {
    pub fn list_query(&self) -> ListQuery {
        ListQuery {
            sort_by: self.sort_by.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
            search: self.q.clone(),
        }
    }
}

/// `?userId=` on routes that carry no body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdParams {
    #[serde(default, deserialize_with = "flexible_id")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    #[serde(default, deserialize_with = "flexible_id")]
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub additional_info: Option<String>,
}

impl CreateRecordRequest {
    pub fn into_input(self) -> RecordInput {
        RecordInput {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            additional_info: self.additional_info,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    #[serde(default, deserialize_with = "flexible_id")]
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateRecordRequest {
    pub fn into_input(self) -> RecordInput {
        RecordInput {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            additional_info: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedRecordResponse {
    pub message: String,
    pub data: DashboardRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_defaults() {
        let params: ListParams = serde_json::from_str(r#"{"userId": 3}"#).unwrap();
        let query = params.list_query();
        assert_eq!(params.user_id, Some(3));
        assert_eq!(query.sort_by, SortField::Id);
        assert_eq!(query.order, SortOrder::Asc);
        assert!(query.search.is_none());
    }

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateRecordRequest =
            serde_json::from_str(r#"{"userId":"4","name":"X","additionalInfo":"note"}"#).unwrap();
        assert_eq!(req.user_id, Some(4));
        let input = req.into_input();
        assert!(input.email.is_none());
        assert_eq!(input.additional_info.as_deref(), Some("note"));
    }
}
