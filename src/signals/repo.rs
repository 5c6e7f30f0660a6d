use anyhow::Context;
use sqlx::SqlitePool;

use crate::signals::repo_types::{Signal, SignalInput};

impl Signal {
    /// Insert every item in one transaction. Either the whole batch commits
    /// or nothing does. Returns the number of rows written.
    pub async fn insert_batch(db: &SqlitePool, items: &[SignalInput]) -> anyhow::Result<u64> {
        let mut tx = db.begin().await.context("begin tx")?;

        let mut written = 0;
        for (i, s) in items.iter().enumerate() {
            let res = sqlx::query(
                r#"
                INSERT INTO signals
                    (user_id, question_id, selected_option, confidence,
                     time_spent_ms, order_index, skipped)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(s.user_id)
            .bind(s.question_id)
            .bind(&s.selected_option)
            .bind(s.confidence)
            .bind(s.time_spent_ms)
            .bind(s.order_index)
            .bind(s.skipped)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert signal {}", i))?;
            written += res.rows_affected();
        }

        tx.commit().await.context("commit tx")?;
        Ok(written)
    }

    /// All signals of a user, ascending by `order_index`, then insertion order.
    pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Signal>> {
        let rows = sqlx::query_as::<_, Signal>(
            r#"
            SELECT id, user_id, question_id, selected_option, confidence,
                   time_spent_ms, order_index, skipped
              FROM signals
             WHERE user_id = ?
             ORDER BY order_index ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list signals by user")?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn input(user_id: i64, question_id: i64, order_index: i64) -> SignalInput {
        SignalInput {
            user_id,
            question_id,
            selected_option: Some(format!("opt-{question_id}")),
            confidence: Some(3),
            time_spent_ms: Some(1200),
            order_index: Some(order_index),
            skipped: false,
        }
    }

    async fn count(db: &SqlitePool) -> i64 {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signals")
            .fetch_one(db)
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn list_is_ordered_by_order_index() {
        let state = AppState::in_memory().await.unwrap();
        let written = Signal::insert_batch(
            &state.db,
            &[input(7, 30, 2), input(7, 10, 0), input(8, 99, 0), input(7, 20, 1)],
        )
        .await
        .unwrap();
        assert_eq!(written, 4);

        let rows = Signal::list_by_user(&state.db, 7).await.unwrap();
        let questions: Vec<_> = rows.iter().map(|s| s.question_id).collect();
        assert_eq!(questions, vec![10, 20, 30]);
        assert!(rows.iter().all(|s| s.user_id == 7));
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let state = AppState::in_memory().await.unwrap();
        Signal::insert_batch(&state.db, &[input(1, 5, 0), input(1, 6, 0)])
            .await
            .unwrap();
        Signal::insert_batch(&state.db, &[input(1, 4, 0)])
            .await
            .unwrap();

        let rows = Signal::list_by_user(&state.db, 1).await.unwrap();
        let questions: Vec<_> = rows.iter().map(|s| s.question_id).collect();
        assert_eq!(questions, vec![5, 6, 4]);
    }

    #[tokio::test]
    async fn nullable_fields_round_trip() {
        let state = AppState::in_memory().await.unwrap();
        let item = SignalInput {
            user_id: 3,
            question_id: 11,
            selected_option: None,
            confidence: None,
            time_spent_ms: None,
            order_index: None,
            skipped: true,
        };
        Signal::insert_batch(&state.db, &[item]).await.unwrap();

        let rows = Signal::list_by_user(&state.db, 3).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].selected_option, None);
        assert_eq!(rows[0].order_index, None);
        assert!(rows[0].skipped);
    }

    #[tokio::test]
    async fn failed_row_rolls_back_whole_batch() {
        let state = AppState::in_memory().await.unwrap();
        sqlx::query(
            r#"
            CREATE TRIGGER reject_question_999 BEFORE INSERT ON signals
            WHEN NEW.question_id = 999
            BEGIN SELECT RAISE(ABORT, 'rejected'); END
            "#,
        )
        .execute(&state.db)
        .await
        .unwrap();

        let err = Signal::insert_batch(
            &state.db,
            &[input(2, 1, 0), input(2, 2, 1), input(2, 999, 2), input(2, 4, 3)],
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("insert signal 2"));
        assert_eq!(count(&state.db).await, 0);
    }

    #[tokio::test]
    async fn unknown_user_is_empty_not_error() {
        let state = AppState::in_memory().await.unwrap();
        let rows = Signal::list_by_user(&state.db, 404).await.unwrap();
        assert!(rows.is_empty());
    }
}
