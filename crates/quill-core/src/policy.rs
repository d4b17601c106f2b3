//! Post mutation policy.
//!
//! Ownership is the sole basis for authorization: a post may be mutated
//! only by the user that created it. The check is stateless and applied
//! before every update, never on reads or creation.

use uuid::Uuid;

use crate::domain::Post;

/// True when `caller_id` is allowed to mutate `post`.
pub fn can_mutate(post: &Post, caller_id: Uuid) -> bool {
    post.author_id == caller_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Post;

    fn post_by(author: Uuid) -> Post {
        Post::new(
            author,
            "title".to_string(),
            "summary".to_string(),
            "content".to_string(),
            "uploads/c.png".to_string(),
        )
    }

    #[test]
    fn author_can_mutate() {
        let author = Uuid::new_v4();
        assert!(can_mutate(&post_by(author), author));
    }

    #[test]
    fn non_author_cannot_mutate() {
        let post = post_by(Uuid::new_v4());
        assert!(!can_mutate(&post, Uuid::new_v4()));
    }
}
