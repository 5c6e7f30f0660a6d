use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::users::repo_types::{User, UserProfileInput};

impl User {
    /// Exact-match lookup, no case folding.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, home_state, grade, board, category, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    /// Insert a user or overwrite every profile field of the existing row for
    /// the same email. `id`, `email` and `created_at` never change.
    pub async fn upsert(db: &SqlitePool, input: &UserProfileInput) -> anyhow::Result<User> {
        let mut tx = db.begin().await.context("begin tx")?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, home_state, grade, board, category, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (email) DO UPDATE SET
                name       = excluded.name,
                home_state = excluded.home_state,
                grade      = excluded.grade,
                board      = excluded.board,
                category   = excluded.category
            RETURNING id, email, name, home_state, grade, board, category, created_at
            "#,
        )
        .bind(&input.email)
        .bind(&input.name)
        .bind(&input.home_state)
        .bind(&input.grade)
        .bind(&input.board)
        .bind(&input.category)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&mut *tx)
        .await
        .context("upsert user")?;

        tx.commit().await.context("commit tx")?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn profile(email: &str, name: &str) -> UserProfileInput {
        UserProfileInput {
            email: email.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_updates_in_place() {
        let state = AppState::in_memory().await.unwrap();

        let mut input = profile("asha@example.com", "Asha");
        input.grade = Some("10".into());
        input.board = Some("CBSE".into());
        let created = User::upsert(&state.db, &input).await.unwrap();

        let mut again = profile("asha@example.com", "Asha K");
        again.home_state = Some("Kerala".into());
        let updated = User::upsert(&state.db, &again).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.name, "Asha K");
        assert_eq!(updated.home_state.as_deref(), Some("Kerala"));
        // full overwrite: fields missing from the second submission are cleared
        assert_eq!(updated.grade, None);
        assert_eq!(updated.board, None);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn find_by_email_is_exact_match() {
        let state = AppState::in_memory().await.unwrap();
        User::upsert(&state.db, &profile("Ravi@Example.com", "Ravi"))
            .await
            .unwrap();

        let hit = User::find_by_email(&state.db, "Ravi@Example.com")
            .await
            .unwrap();
        assert_eq!(hit.map(|u| u.name).as_deref(), Some("Ravi"));

        let miss = User::find_by_email(&state.db, "ravi@example.com")
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn distinct_emails_get_distinct_ids() {
        let state = AppState::in_memory().await.unwrap();
        let a = User::upsert(&state.db, &profile("a@example.com", "A"))
            .await
            .unwrap();
        let b = User::upsert(&state.db, &profile("b@example.com", "B"))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }
}
