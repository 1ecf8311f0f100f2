use chrono::Utc;

use super::Store;
use crate::error::{AppError, AppResult};
use crate::models::Post;

#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

impl Store {
    pub async fn create_post(
        &self,
        owner_id: i64,
        title: &str,
        content: &str,
        published: bool,
    ) -> AppResult<Post> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO posts (owner_id, title, content, published, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        )
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .bind(published)
        .bind(now)
        .execute(self.pool())
        .await?
        .last_insert_rowid();

        self.post_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal("Post vanished after insert".into()))
    }

    pub async fn post_by_id(&self, id: i64) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(post)
    }

    pub async fn update_post(&self, id: i64, update: &PostUpdate) -> AppResult<()> {
        sqlx::query(
            "UPDATE posts SET \
                title = COALESCE(?1, title), \
                content = COALESCE(?2, content), \
                published = COALESCE(?3, published), \
                updated_at = ?4 \
             WHERE id = ?5",
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(update.published)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Delete a post together with its comments, likes and notifications.
    pub async fn delete_post(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM comments WHERE post_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM likes WHERE post_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM notifications WHERE post_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn increment_view_count(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn published_posts(&self, offset: i64, limit: i64) -> AppResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE published = 1 \
             ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;
        Ok(posts)
    }

    pub async fn posts_by_owner(&self, owner_id: i64) -> AppResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE owner_id = ?1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;
        Ok(posts)
    }

    pub async fn posts_count(&self, owner_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE owner_id = ?1")
            .bind(owner_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Published posts from the given user and everyone they follow,
    /// newest first.
    pub async fn feed_posts(&self, user_id: i64, offset: i64, limit: i64) -> AppResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT p.* FROM posts p \
             WHERE p.published = 1 AND (p.owner_id = ?1 OR p.owner_id IN \
                 (SELECT followed_id FROM follows WHERE follower_id = ?1)) \
             ORDER BY p.created_at DESC LIMIT ?2 OFFSET ?3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;
        Ok(posts)
    }

    pub async fn search_posts(&self, query: &str, limit: i64) -> AppResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts \
             WHERE published = 1 AND (title LIKE '%' || ?1 || '%' OR content LIKE '%' || ?1 || '%') \
             ORDER BY created_at DESC LIMIT ?2",
        )
        .bind(query)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        Ok(posts)
    }
}
