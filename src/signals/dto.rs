use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    error::AppError,
    signals::repo_types::{Signal, SignalInput},
};

/// Signal as replayed by `GET /api/signals/user/{userId}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalView {
    pub question_id: i64,
    pub selected_option: Option<String>,
    pub confidence: Option<i64>,
    pub time_spent_ms: Option<i64>,
    pub order_index: Option<i64>,
    pub skipped: bool,
}

impl From<Signal> for SignalView {
    fn from(s: Signal) -> Self {
        Self {
            question_id: s.question_id,
            selected_option: s.selected_option,
            confidence: s.confidence,
            time_spent_ms: s.time_spent_ms,
            order_index: s.order_index,
            skipped: s.skipped,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Validate a whole `POST /api/signals/batch` body before anything is written.
/// Items are checked in order and the first failure wins.
pub fn parse_batch(body: &Value) -> Result<Vec<SignalInput>, AppError> {
    let items = match body.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::bad_request("Invalid payload")),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(item).map_err(|e| e.at(index)))
        .collect()
}

enum ItemError {
    UserIdMissing,
    Invalid(String),
}

impl ItemError {
    fn at(self, index: usize) -> AppError {
        match self {
            ItemError::UserIdMissing => AppError::bad_request("userId missing"),
            ItemError::Invalid(reason) => AppError::InvalidSignal { index, reason },
        }
    }
}

fn parse_item(item: &Value) -> Result<SignalInput, ItemError> {
    let obj = item
        .as_object()
        .ok_or_else(|| ItemError::Invalid("expected an object".into()))?;

    let user_id = match obj.get("userId") {
        Some(v) if is_truthy(v) => {
            as_int(v).ok_or_else(|| ItemError::Invalid("userId must be an integer".into()))?
        }
        _ => return Err(ItemError::UserIdMissing),
    };

    Ok(SignalInput {
        user_id,
        question_id: required_int(obj, "questionId")?,
        selected_option: nullable_str(obj, "selectedOption")?,
        confidence: nullable_int(obj, "confidence")?,
        time_spent_ms: nullable_int(obj, "timeSpentMs")?,
        order_index: nullable_int(obj, "orderIndex")?,
        skipped: match obj.get("skipped") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => return Err(ItemError::Invalid("skipped must be a boolean".into())),
        },
    })
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// JS clients may send integral values as floats (1500.0)
fn as_int(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn required_int(obj: &Map<String, Value>, key: &str) -> Result<i64, ItemError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ItemError::Invalid(format!("{key} is required"))),
        Some(v) => as_int(v).ok_or_else(|| ItemError::Invalid(format!("{key} must be an integer"))),
    }
}

fn nullable_int(obj: &Map<String, Value>, key: &str) -> Result<Option<i64>, ItemError> {
    match obj.get(key) {
        None => Err(ItemError::Invalid(format!("{key} is required"))),
        Some(Value::Null) => Ok(None),
        Some(v) => as_int(v)
            .map(Some)
            .ok_or_else(|| ItemError::Invalid(format!("{key} must be an integer or null"))),
    }
}

fn nullable_str(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, ItemError> {
    match obj.get(key) {
        None => Err(ItemError::Invalid(format!("{key} is required"))),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ItemError::Invalid(format!("{key} must be a string or null"))),
    }
}
