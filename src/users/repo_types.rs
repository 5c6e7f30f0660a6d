use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                    // rowid, assigned on first submission
    pub email: String,              // natural key, immutable once created
    pub name: String,
    pub home_state: Option<String>,
    pub grade: Option<String>,
    pub board: Option<String>,
    pub category: Option<String>,
    pub created_at: OffsetDateTime, // set once on insert
}

/// Profile fields written by an upsert. Absent optionals are stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfileInput {
    pub email: String,
    pub name: String,
    pub home_state: Option<String>,
    pub grade: Option<String>,
    pub board: Option<String>,
    pub category: Option<String>,
}
