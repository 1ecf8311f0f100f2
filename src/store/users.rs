use chrono::Utc;

use super::Store;
use crate::error::AppResult;
use crate::models::User;

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
}

impl Store {
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .execute(self.pool())
        .await?
        .last_insert_rowid();

        self.user_by_id(id)
            .await?
            .ok_or_else(|| crate::error::AppError::Internal("User vanished after insert".into()))
    }

    pub async fn user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET \
                full_name = COALESCE(?1, full_name), \
                bio = COALESCE(?2, bio), \
                location = COALESCE(?3, location), \
                website = COALESCE(?4, website) \
             WHERE id = ?5",
        )
        .bind(&update.full_name)
        .bind(&update.bio)
        .bind(&update.location)
        .bind(&update.website)
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn set_avatar_path(&self, id: i64, path: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET avatar_path = ?1 WHERE id = ?2")
            .bind(path)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Delete a user and everything hanging off them: their posts (with
    /// those posts' comments, likes and notifications), their own comments
    /// and likes, follow edges in both directions, and notifications they
    /// sent or received.
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        let post_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM posts WHERE owner_id = ?1")
                .bind(id)
                .fetch_all(self.pool())
                .await?;
        for post_id in post_ids {
            self.delete_post(post_id).await?;
        }

        sqlx::query("DELETE FROM comments WHERE owner_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM likes WHERE owner_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM follows WHERE follower_id = ?1 OR followed_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM notifications WHERE recipient_id = ?1 OR sender_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn search_users(&self, query: &str, limit: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users \
             WHERE username LIKE '%' || ?1 || '%' OR full_name LIKE '%' || ?1 || '%' \
             ORDER BY username LIMIT ?2",
        )
        .bind(query)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }
}
