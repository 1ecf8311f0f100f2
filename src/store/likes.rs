use chrono::Utc;

use super::Store;
use crate::error::AppResult;

impl Store {
    pub async fn create_like(&self, owner_id: i64, post_id: i64) -> AppResult<()> {
        sqlx::query("INSERT INTO likes (owner_id, post_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(owner_id)
            .bind(post_id)
            .bind(Utc::now())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Returns whether a like was actually removed.
    pub async fn delete_like(&self, owner_id: i64, post_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE owner_id = ?1 AND post_id = ?2")
            .bind(owner_id)
            .bind(post_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn like_exists(&self, owner_id: i64, post_id: i64) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE owner_id = ?1 AND post_id = ?2")
                .bind(owner_id)
                .bind(post_id)
                .fetch_one(self.pool())
                .await?;
        Ok(count > 0)
    }

    pub async fn likes_count(&self, post_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = ?1")
            .bind(post_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Likes received across all of a user's posts.
    pub async fn likes_received_count(&self, owner_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM likes l \
             JOIN posts p ON p.id = l.post_id WHERE p.owner_id = ?1",
        )
        .bind(owner_id)
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }
}
