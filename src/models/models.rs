use serde::{Deserialize, Serialize};

pub use crate::models::timestamp::Timestamp;

pub type UserId = u32;
pub type PostId = u32;
pub type CommentId = u32;
pub type NotificationId = u32;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2 PHC string, never the plaintext.
    pub password: String,
    #[serde(default)]
    pub bio: String,
    /// Users this account follows, in follow order.
    #[serde(default)]
    pub following: Vec<UserId>,
    /// Users following this account, in follow order.
    #[serde(default)]
    pub followers: Vec<UserId>,
}

impl User {
    pub fn is_following(&self, target_id: UserId) -> bool {
        self.following.contains(&target_id)
    }

    pub fn following_count(&self) -> usize {
        self.following.len()
    }

    pub fn follower_count(&self) -> usize {
        self.followers.len()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: Timestamp,
    pub like_count: u32,
    /// Insertion order, oldest first.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Id the next comment on this post will receive, `None` once the last
    /// comment holds the largest possible id.
    pub fn next_comment_id(&self) -> Option<CommentId> {
        match self.comments.last() {
            Some(c) => c.id.checked_add(1),
            None => Some(0),
        }
    }
}

/// Lower discriminant means higher priority.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NotificationType {
    Comment = 1,
    Like = 2,
    Follow = 3,
}

impl NotificationType {
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            NotificationType::Comment => "COMMENT",
            NotificationType::Like => "LIKE",
            NotificationType::Follow => "FOLLOW",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationType,
    pub source_user_id: UserId,
    /// `None` for follow notifications.
    pub related_post_id: Option<PostId>,
    pub message: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub is_read: bool,
}

impl Notification {
    /// Whether `self` should be delivered before `other`: by type, then
    /// earliest first.
    pub fn has_higher_priority(&self, other: &Notification) -> bool {
        if self.kind != other.kind {
            return self.kind.priority() < other.kind.priority();
        }
        self.created_at.is_earlier(&other.created_at)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Profile,
    Post,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub target_id: String,
    pub display_username: String,
    pub post_title: Option<String>,
}

impl HistoryEntry {
    pub fn profile(target_id: impl Into<String>, username: impl Into<String>) -> Self {
        HistoryEntry {
            kind: HistoryKind::Profile,
            target_id: target_id.into(),
            display_username: username.into(),
            post_title: None,
        }
    }

    pub fn post(
        target_id: impl Into<String>,
        author_username: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            kind: HistoryKind::Post,
            target_id: target_id.into(),
            display_username: author_username.into(),
            post_title: Some(title.into()),
        }
    }

    /// Two entries name the same resource when kind and target match.
    pub fn same_target(&self, other: &HistoryEntry) -> bool {
        self.kind == other.kind && self.target_id == other.target_id
    }
}
