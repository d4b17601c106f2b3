use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog article with an uploaded cover image.
///
/// `author_id` is fixed at creation time and never changes afterwards;
/// mutation of the remaining fields is gated by [`crate::policy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    /// Relative path of the uploaded cover image.
    pub cover: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field updates applied to an existing post.
///
/// `cover` is `None` when the caller supplied no replacement file, in
/// which case the existing cover is kept.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover: Option<String>,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(
        author_id: Uuid,
        title: String,
        summary: String,
        content: String,
        cover: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            summary,
            content,
            cover,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge field changes into the post. The author link is untouched.
    pub fn apply(&mut self, changes: PostChanges) {
        self.title = changes.title;
        self.summary = changes.summary;
        self.content = changes.content;
        if let Some(cover) = changes.cover {
            self.cover = cover;
        }
        self.updated_at = Utc::now();
    }
}
