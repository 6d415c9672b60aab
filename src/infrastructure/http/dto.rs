//! Wire shapes of the backend REST API.

use crate::domain::entities::UserProfile;
use crate::domain::value_objects::StopStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, rename = "token_type")]
    pub _token_type: Option<String>,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct DutyStatusRequest {
    pub on_duty: bool,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct StopStatusRequest {
    pub status: StopStatus,
}

#[derive(Debug, Serialize)]
pub struct ReorderStopsRequest<'a> {
    pub stop_ids: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct ErpStatusRequest<'a> {
    pub status: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PreferenceWriteRequest<'a> {
    pub value: &'a Value,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceResponse {
    #[serde(default)]
    pub value: Option<Value>,
}

/// List endpoints answer either with a bare array or with `{ "items": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { items: Vec<T> },
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped { items } => items,
        }
    }
}

/// Single-record endpoints answer with the record or `{ "data": record }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> RecordEnvelope<T> {
    pub fn into_record(self) -> T {
        match self {
            RecordEnvelope::Wrapped { data } => data,
            RecordEnvelope::Bare(record) => record,
        }
    }
}
