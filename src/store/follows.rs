use chrono::Utc;

use super::Store;
use crate::error::AppResult;
use crate::models::User;

impl Store {
    pub async fn create_follow(&self, follower_id: i64, followed_id: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO follows (follower_id, followed_id, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Returns whether an edge was actually removed.
    pub async fn delete_follow(&self, follower_id: i64, followed_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2")
                .bind(follower_id)
                .bind(followed_id)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn follow_exists(&self, follower_id: i64, followed_id: i64) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(self.pool())
        .await?;
        Ok(count > 0)
    }

    pub async fn followers_count(&self, user_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE followed_id = ?1")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    pub async fn following_count(&self, user_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = ?1")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    pub async fn following_of(&self, user_id: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN follows f ON f.followed_id = u.id \
             WHERE f.follower_id = ?1 ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }

    pub async fn followers_of(&self, user_id: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN follows f ON f.follower_id = u.id \
             WHERE f.followed_id = ?1 ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(users)
    }
}
