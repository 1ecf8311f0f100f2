use chrono::Utc;

use super::Store;
use crate::error::AppResult;
use crate::models::{Notification, NotificationKind};

impl Store {
    pub async fn create_notification(
        &self,
        recipient_id: i64,
        sender_id: Option<i64>,
        kind: NotificationKind,
        message: &str,
        post_id: Option<i64>,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications (recipient_id, sender_id, kind, message, post_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .bind(kind.as_str())
        .bind(message)
        .bind(post_id)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    pub async fn notification_by_id(&self, id: i64) -> AppResult<Option<Notification>> {
        let notification =
            sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?1")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
        Ok(notification)
    }

    pub async fn notifications_for(
        &self,
        recipient_id: i64,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        let sql = if unread_only {
            "SELECT * FROM notifications WHERE recipient_id = ?1 AND is_read = 0 \
             ORDER BY created_at DESC"
        } else {
            "SELECT * FROM notifications WHERE recipient_id = ?1 ORDER BY created_at DESC"
        };
        let notifications = sqlx::query_as::<_, Notification>(sql)
            .bind(recipient_id)
            .fetch_all(self.pool())
            .await?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, recipient_id: i64) -> AppResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
        )
        .bind(recipient_id)
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }

    /// Idempotent: marking an already-read notification again is a no-op.
    pub async fn mark_notification_read(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, recipient_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE recipient_id = ?1")
            .bind(recipient_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
