//! Relationship & authorization engine.
//!
//! Single home for the rules deciding who may act on which entity, the
//! notification fan-out on follow/like/comment, and the derived view
//! fields (`is_following`, `is_liked`, all counts). Derived fields are
//! recomputed from the store on every call, never cached, so a response
//! always reflects the latest committed state.
//!
//! Gated operations evaluate Not Found before Forbidden before Conflict:
//! following a nonexistent user reports Not Found, not a duplicate-check
//! result.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{Comment, NotificationKind, Post, User};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar_path: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
    pub is_following: bool,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: i64,
    pub owner_id: i64,
    pub author: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub replies_count: i64,
    pub replies: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct StatsOverview {
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub likes_received: i64,
    pub comments_received: i64,
    pub unread_notifications: i64,
}

#[derive(Clone)]
pub struct Engine {
    store: Store,
}

impl Engine {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // --- ownership gates ---

    /// Not Found takes precedence over Forbidden.
    pub async fn ensure_post_owner(&self, actor: &User, post_id: i64) -> AppResult<Post> {
        let post = self
            .store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        if post.owner_id != actor.id {
            return Err(AppError::Forbidden(
                "Not the owner of this post".to_string(),
            ));
        }
        Ok(post)
    }

    pub async fn ensure_comment_owner(&self, actor: &User, comment_id: i64) -> AppResult<Comment> {
        let comment = self
            .store
            .comment_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;
        if comment.owner_id != actor.id {
            return Err(AppError::Forbidden(
                "Not the owner of this comment".to_string(),
            ));
        }
        Ok(comment)
    }

    // --- follow edges ---

    pub async fn follow(&self, actor: &User, target_username: &str) -> AppResult<()> {
        let target = self
            .store
            .user_by_username(target_username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if target.id == actor.id {
            return Err(AppError::Conflict("Cannot follow yourself".to_string()));
        }
        if self.store.follow_exists(actor.id, target.id).await? {
            return Err(AppError::Conflict(
                "Already following this user".to_string(),
            ));
        }
        self.store.create_follow(actor.id, target.id).await?;
        self.store
            .create_notification(
                target.id,
                Some(actor.id),
                NotificationKind::Follow,
                &format!("{} started following you", actor.username),
                None,
            )
            .await?;
        tracing::info!("{} followed {}", actor.username, target.username);
        Ok(())
    }

    pub async fn unfollow(&self, actor: &User, target_username: &str) -> AppResult<()> {
        let target = self
            .store
            .user_by_username(target_username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if !self.store.delete_follow(actor.id, target.id).await? {
            return Err(AppError::Conflict("Not following this user".to_string()));
        }
        Ok(())
    }

    // --- likes ---

    pub async fn like(&self, actor: &User, post_id: i64) -> AppResult<()> {
        let post = self
            .store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        if self.store.like_exists(actor.id, post.id).await? {
            return Err(AppError::Conflict("Post already liked".to_string()));
        }
        self.store.create_like(actor.id, post.id).await?;
        // No self-notification
        if post.owner_id != actor.id {
            self.store
                .create_notification(
                    post.owner_id,
                    Some(actor.id),
                    NotificationKind::Like,
                    &format!("{} liked your post", actor.username),
                    Some(post.id),
                )
                .await?;
        }
        Ok(())
    }

    pub async fn unlike(&self, actor: &User, post_id: i64) -> AppResult<()> {
        let post = self
            .store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        if !self.store.delete_like(actor.id, post.id).await? {
            return Err(AppError::Conflict("Post not liked".to_string()));
        }
        Ok(())
    }

    // --- comments ---

    /// Any authenticated actor may comment on any existing post. Replies
    /// are limited to one level: the parent must be a top-level comment
    /// on the same post.
    pub async fn comment(
        &self,
        actor: &User,
        post_id: i64,
        content: &str,
        parent_id: Option<i64>,
    ) -> AppResult<Comment> {
        let post = self
            .store
            .post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if let Some(pid) = parent_id {
            let parent = self
                .store
                .comment_by_id(pid)
                .await?
                .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;
            if parent.post_id != post.id {
                return Err(AppError::Validation(
                    "Parent comment belongs to a different post".to_string(),
                ));
            }
            if parent.parent_id.is_some() {
                return Err(AppError::Validation(
                    "Replies cannot be nested further".to_string(),
                ));
            }
        }

        let comment = self
            .store
            .create_comment(actor.id, post.id, parent_id, content)
            .await?;

        if post.owner_id != actor.id {
            self.store
                .create_notification(
                    post.owner_id,
                    Some(actor.id),
                    NotificationKind::Comment,
                    &format!("{} commented on your post", actor.username),
                    Some(post.id),
                )
                .await?;
        }
        Ok(comment)
    }

    pub async fn delete_comment(&self, actor: &User, comment_id: i64) -> AppResult<()> {
        let comment = self.ensure_comment_owner(actor, comment_id).await?;
        self.store.delete_comment(comment.id).await
    }

    // --- view enrichment ---

    pub async fn user_view(&self, user: &User, viewer: Option<&User>) -> AppResult<UserView> {
        let is_following = match viewer {
            Some(v) if v.id != user.id => self.store.follow_exists(v.id, user.id).await?,
            _ => false,
        };
        Ok(UserView {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            location: user.location.clone(),
            website: user.website.clone(),
            avatar_path: user.avatar_path.clone(),
            is_verified: user.is_verified,
            created_at: user.created_at,
            followers_count: self.store.followers_count(user.id).await?,
            following_count: self.store.following_count(user.id).await?,
            posts_count: self.store.posts_count(user.id).await?,
            is_following,
        })
    }

    pub async fn post_view(&self, post: &Post, viewer: Option<&User>) -> AppResult<PostView> {
        let author = self
            .store
            .user_by_id(post.owner_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_string());
        let is_liked = match viewer {
            Some(v) => self.store.like_exists(v.id, post.id).await?,
            None => false,
        };
        Ok(PostView {
            id: post.id,
            owner_id: post.owner_id,
            author,
            title: post.title.clone(),
            content: post.content.clone(),
            published: post.published,
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            likes_count: self.store.likes_count(post.id).await?,
            comments_count: self.store.comments_count(post.id).await?,
            is_liked,
        })
    }

    pub async fn post_views(
        &self,
        posts: &[Post],
        viewer: Option<&User>,
    ) -> AppResult<Vec<PostView>> {
        try_join_all(posts.iter().map(|p| self.post_view(p, viewer))).await
    }

    async fn comment_view(&self, comment: &Comment) -> AppResult<CommentView> {
        let author = self
            .store
            .user_by_id(comment.owner_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| "unknown".to_string());
        Ok(CommentView {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author,
            content: comment.content.clone(),
            created_at: comment.created_at,
            replies_count: self.store.replies_count(comment.id).await?,
            replies: Vec::new(),
        })
    }

    /// Top-level comments with their single level of replies inlined.
    pub async fn comments_for_post(&self, post_id: i64) -> AppResult<Vec<CommentView>> {
        if self.store.post_by_id(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        let top_level = self.store.top_level_comments(post_id).await?;
        let mut views = try_join_all(top_level.iter().map(|c| self.comment_view(c))).await?;
        for view in &mut views {
            if view.replies_count > 0 {
                let children = self.store.replies_of(view.id).await?;
                view.replies =
                    try_join_all(children.iter().map(|c| self.comment_view(c))).await?;
            }
        }
        Ok(views)
    }

    // --- feed ---

    pub async fn feed(&self, actor: &User, offset: i64, limit: i64) -> AppResult<Vec<PostView>> {
        let posts = self.store.feed_posts(actor.id, offset, limit).await?;
        self.post_views(&posts, Some(actor)).await
    }

    // --- notifications ---

    /// Not Found before Forbidden; marking twice is a no-op.
    pub async fn mark_notification_read(&self, actor: &User, id: i64) -> AppResult<()> {
        let notification = self
            .store
            .notification_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
        if notification.recipient_id != actor.id {
            return Err(AppError::Forbidden(
                "Not the recipient of this notification".to_string(),
            ));
        }
        self.store.mark_notification_read(id).await
    }

    pub async fn mark_all_notifications_read(&self, actor: &User) -> AppResult<()> {
        self.store.mark_all_read(actor.id).await
    }

    // --- stats ---

    pub async fn stats_overview(&self, actor: &User) -> AppResult<StatsOverview> {
        Ok(StatsOverview {
            posts_count: self.store.posts_count(actor.id).await?,
            followers_count: self.store.followers_count(actor.id).await?,
            following_count: self.store.following_count(actor.id).await?,
            likes_received: self.store.likes_received_count(actor.id).await?,
            comments_received: self.store.comments_received_count(actor.id).await?,
            unread_notifications: self.store.unread_count(actor.id).await?,
        })
    }
}
