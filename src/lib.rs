//! In-memory social content store.
//!
//! A user registry with a symmetric follow graph, a newest-first post store
//! with comments and likes, per-user priority notification inboxes, feeds
//! built from followed authors, and bounded browsing history. [`SocialApp`]
//! ties the pieces together; every component can also be used on its own.

pub mod app;
pub mod auth;
pub mod config;
pub mod feed;
pub mod follow;
pub mod history;
pub mod notifications;
pub mod posts;
pub mod users;

pub mod models {
    pub mod models;
    pub mod timestamp;
}

pub mod core {
    pub mod db;
    pub mod errors;
    pub mod helpers;
    pub mod storage;
}

pub use crate::app::SocialApp;
pub use crate::config::Config;
pub use crate::core::errors::{CoreError, ErrorKind, Result};
pub use crate::core::helpers::{Clock, ManualClock, SystemClock};
pub use crate::feed::FeedBuilder;
pub use crate::history::HistoryStack;
pub use crate::models::models::{
    Comment, CommentId, HistoryEntry, HistoryKind, Notification, NotificationId, NotificationType,
    Post, PostId, Timestamp, User, UserId,
};
pub use crate::notifications::NotificationQueue;
pub use crate::posts::ContentStore;
pub use crate::users::UserRegistry;
