use thiserror::Error;

use crate::config::{
    MAX_BIO_LENGTH, MAX_POST_LENGTH, MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH,
};
use crate::models::models::{NotificationId, PostId, UserId};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Coarse classification of every failure the core reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    NotOwner,
    Invalid,
    Duplicate,
    Full,
    Empty,
    Unauthorized,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("username must be {}-{} characters", MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH)]
    InvalidUsername,

    #[error("password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("bio too long (max {} characters)", MAX_BIO_LENGTH)]
    BioTooLong,

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("no account named '{0}'")]
    UnknownUsername(String),

    #[error("wrong password")]
    WrongPassword,

    #[error("users cannot follow themselves")]
    SelfFollow,

    #[error("already following user {0}")]
    AlreadyFollowing(UserId),

    #[error("not following user {0}")]
    NotFollowing(UserId),

    #[error("post {0} not found")]
    PostNotFound(PostId),

    #[error("only the author can modify this post")]
    NotOwner,

    #[error("content cannot be empty")]
    EmptyContent,

    #[error("content is {len} characters (max {})", MAX_POST_LENGTH)]
    ContentTooLong { len: usize },

    #[error("you cannot like your own post")]
    SelfLike,

    #[error("post has no likes to remove")]
    NoLikesToRemove,

    #[error("notification queue is full ({capacity} entries)")]
    QueueFull { capacity: usize },

    #[error("no notifications")]
    QueueEmpty,

    #[error("notification {0} not found")]
    NotificationNotFound(NotificationId),

    #[error("no browsing history")]
    HistoryEmpty,

    #[error("id {0} is already in use")]
    DuplicateId(u32),

    #[error("no ids left to assign")]
    IdsExhausted,

    #[error("like count is at its maximum")]
    TooManyLikes,

    #[error("credential hashing failed: {0}")]
    CredentialHashing(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::UserNotFound(_)
            | CoreError::UnknownUsername(_)
            | CoreError::NotFollowing(_)
            | CoreError::PostNotFound(_)
            | CoreError::NotificationNotFound(_) => ErrorKind::NotFound,
            CoreError::NotOwner => ErrorKind::NotOwner,
            CoreError::InvalidUsername
            | CoreError::WeakPassword
            | CoreError::BioTooLong
            | CoreError::SelfFollow
            | CoreError::EmptyContent
            | CoreError::ContentTooLong { .. }
            | CoreError::SelfLike
            | CoreError::NoLikesToRemove => ErrorKind::Invalid,
            CoreError::UsernameTaken(_)
            | CoreError::AlreadyFollowing(_)
            | CoreError::DuplicateId(_) => ErrorKind::Duplicate,
            CoreError::QueueFull { .. } | CoreError::IdsExhausted | CoreError::TooManyLikes => {
                ErrorKind::Full
            }
            CoreError::QueueEmpty | CoreError::HistoryEmpty => ErrorKind::Empty,
            CoreError::WrongPassword => ErrorKind::Unauthorized,
            CoreError::CredentialHashing(_) => ErrorKind::Internal,
        }
    }
}
