use sqlx::FromRow;

/// One recorded answer. Rows are immutable once inserted.
#[derive(Debug, Clone, FromRow)]
pub struct Signal {
    pub id: i64,
    pub user_id: i64,
    pub question_id: i64,
    pub selected_option: Option<String>,
    pub confidence: Option<i64>,
    pub time_spent_ms: Option<i64>,
    pub order_index: Option<i64>,
    pub skipped: bool,
}

/// A validated batch item, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalInput {
    pub user_id: i64,
    pub question_id: i64,
    pub selected_option: Option<String>,
    pub confidence: Option<i64>,
    pub time_spent_ms: Option<i64>,
    pub order_index: Option<i64>,
    pub skipped: bool,
}
