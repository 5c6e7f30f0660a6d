use serde::Serialize;
use serde_json::{Map, Value};

use crate::{error::AppError, users::repo_types::UserProfileInput};

/// Projection returned by `GET /api/users/email/{email}`.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub grade: Option<String>,
    pub board: Option<String>,
}

/// Projection returned by `POST /api/users`.
#[derive(Debug, Serialize)]
pub struct UpsertedUser {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Request body for `POST /api/users`, validated from raw JSON so that a
/// missing field is reported by name.
#[derive(Debug, PartialEq, Eq)]
pub struct UpsertUserRequest(pub UserProfileInput);

impl UpsertUserRequest {
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::bad_request("Invalid payload"))?;

        Ok(Self(UserProfileInput {
            email: required_str(obj, "email")?,
            name: required_str(obj, "name")?,
            home_state: optional_str(obj, "homeState")?,
            grade: optional_str(obj, "grade")?,
            board: optional_str(obj, "board")?,
            category: optional_str(obj, "category")?,
        }))
    }
}

fn required_str(obj: &Map<String, Value>, key: &str) -> Result<String, AppError> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(AppError::bad_request(format!("{key} is required")))
        }
        Some(_) => Err(AppError::bad_request(format!("{key} must be a string"))),
    }
}

fn optional_str(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, AppError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(AppError::bad_request(format!(
            "{key} must be a string or null"
        ))),
    }
}
