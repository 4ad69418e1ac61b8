//! Product comments with reply threads.
//!
//! New comments start hidden (`is_active == false`) until moderated. Listings
//! show active comments only, newest first.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::entity::Timestamped;
use storefront_core::{CommentId, DomainError, DomainResult, Entity, ProductId, UserId};

const EXCERPT_CHARS: usize = 20;

/// Input for posting a comment or a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub product: ProductId,
    pub user: UserId,
    pub parent: Option<CommentId>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    product: ProductId,
    user: UserId,
    parent: Option<CommentId>,
    body: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Comment {
    pub fn create(id: CommentId, new: NewComment, created_at: DateTime<Utc>) -> DomainResult<Self> {
        if new.body.trim().is_empty() {
            return Err(DomainError::validation("comment body cannot be empty"));
        }
        if new.parent == Some(id) {
            return Err(DomainError::invariant("comment cannot reply to itself"));
        }

        Ok(Self {
            id,
            product: new.product,
            user: new.user,
            parent: new.parent,
            body: new.body,
            is_active: false,
            created_at,
        })
    }

    pub fn product(&self) -> ProductId {
        self.product
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn parent(&self) -> Option<CommentId> {
        self.parent
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// First 20 characters of the body.
    pub fn excerpt(&self) -> &str {
        match self.body.char_indices().nth(EXCERPT_CHARS) {
            Some((end, _)) => &self.body[..end],
            None => &self.body,
        }
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Timestamped for Comment {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl core::fmt::Display for Comment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "comment by {}: {}", self.user, self.excerpt())
    }
}

/// Newest first; ties broken by id so the order is stable.
pub fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// An active comment and its visible replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<CommentThread>,
}

impl CommentThread {
    /// Number of comments in this thread, root included.
    pub fn count(&self) -> usize {
        1 + self.replies.iter().map(CommentThread::count).sum::<usize>()
    }
}

/// Nest active comments under their active parents.
///
/// Inactive comments are dropped together with every reply beneath them, and
/// so are replies whose parent is not in `comments`. Each level is ordered
/// newest first.
pub fn build_threads(comments: &[Comment]) -> Vec<CommentThread> {
    let mut children: HashMap<Option<CommentId>, Vec<Comment>> = HashMap::new();
    for comment in comments.iter().filter(|c| c.is_active) {
        children.entry(comment.parent).or_default().push(comment.clone());
    }
    for level in children.values_mut() {
        sort_newest_first(level);
    }

    let roots = children.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|root| attach_replies(root, &mut children))
        .collect()
}

fn attach_replies(
    comment: Comment,
    children: &mut HashMap<Option<CommentId>, Vec<Comment>>,
) -> CommentThread {
    let replies = children
        .remove(&Some(comment.id))
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach_replies(reply, children))
        .collect();
    CommentThread { comment, replies }
}
