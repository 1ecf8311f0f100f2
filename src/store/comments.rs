use chrono::Utc;

use super::Store;
use crate::error::{AppError, AppResult};
use crate::models::Comment;

impl Store {
    pub async fn create_comment(
        &self,
        owner_id: i64,
        post_id: i64,
        parent_id: Option<i64>,
        content: &str,
    ) -> AppResult<Comment> {
        let id = sqlx::query(
            "INSERT INTO comments (owner_id, post_id, parent_id, content, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(owner_id)
        .bind(post_id)
        .bind(parent_id)
        .bind(content)
        .bind(Utc::now())
        .execute(self.pool())
        .await?
        .last_insert_rowid();

        self.comment_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal("Comment vanished after insert".into()))
    }

    pub async fn comment_by_id(&self, id: i64) -> AppResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(comment)
    }

    /// Delete a comment and its direct replies.
    pub async fn delete_comment(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM comments WHERE parent_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn top_level_comments(&self, post_id: i64) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE post_id = ?1 AND parent_id IS NULL \
             ORDER BY created_at",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await?;
        Ok(comments)
    }

    pub async fn replies_of(&self, comment_id: i64) -> AppResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE parent_id = ?1 ORDER BY created_at",
        )
        .bind(comment_id)
        .fetch_all(self.pool())
        .await?;
        Ok(comments)
    }

    pub async fn replies_count(&self, comment_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE parent_id = ?1")
            .bind(comment_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    pub async fn comments_count(&self, post_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?1")
            .bind(post_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Comments received across all of a user's posts.
    pub async fn comments_received_count(&self, owner_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments c \
             JOIN posts p ON p.id = c.post_id WHERE p.owner_id = ?1",
        )
        .bind(owner_id)
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }
}
