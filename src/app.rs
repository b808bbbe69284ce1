use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::config::Config;
use crate::core::errors::{CoreError, Result};
use crate::core::helpers::{Clock, SystemClock};
use crate::feed::FeedBuilder;
use crate::follow::{follow_user, is_following, unfollow_user};
use crate::history::HistoryStack;
use crate::models::models::{
    CommentId, HistoryEntry, Notification, NotificationId, NotificationType, Post, PostId, User,
    UserId,
};
use crate::notifications::NotificationQueue;
use crate::posts::ContentStore;
use crate::users::UserRegistry;

/// Owns one instance of every component and runs the user-facing flows that
/// touch more than one of them. Every call runs to completion before the next
/// begins; wrap the whole value in a lock if several callers share it.
pub struct SocialApp {
    config: Config,
    clock: Box<dyn Clock>,
    pub(crate) users: UserRegistry,
    pub(crate) posts: ContentStore,
    pub(crate) inboxes: BTreeMap<UserId, NotificationQueue>,
    histories: BTreeMap<UserId, HistoryStack>,
}

impl std::fmt::Debug for SocialApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialApp")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SocialApp {
    pub fn new(config: Config) -> Self {
        SocialApp::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: Config, clock: Box<dyn Clock>) -> Self {
        SocialApp {
            users: UserRegistry::new(config.hash_cost),
            posts: ContentStore::new(),
            inboxes: BTreeMap::new(),
            histories: BTreeMap::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    pub fn content(&self) -> &ContentStore {
        &self.posts
    }

    fn username_of(&self, id: UserId) -> String {
        self.users
            .find_by_id(id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| format!("user {}", id))
    }

    fn require_user(&self, id: UserId) -> Result<&User> {
        self.users.find_by_id(id).ok_or(CoreError::UserNotFound(id))
    }

    /// Best effort: a full inbox is logged and the triggering action still
    /// counts as done.
    fn notify(
        &mut self,
        recipient: UserId,
        kind: NotificationType,
        source: UserId,
        related_post_id: Option<PostId>,
        message: String,
    ) {
        let now = self.clock.now();
        let capacity = self.config.notification_capacity;
        let inbox = self
            .inboxes
            .entry(recipient)
            .or_insert_with(|| NotificationQueue::new(capacity));
        if let Err(err) = inbox.insert(kind, source, related_post_id, &message, now) {
            warn!(recipient, %err, "notification dropped");
        }
    }

    // === Accounts ===

    pub fn register(&mut self, username: &str, password: &str, bio: &str) -> Result<UserId> {
        self.users.register(username, password, bio).map(|u| u.id)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<&User> {
        self.users.login(username, password)
    }

    pub fn update_bio(&mut self, user_id: UserId, bio: &str) -> Result<()> {
        self.users.update_bio(user_id, bio)
    }

    pub fn change_password(&mut self, user_id: UserId, old: &str, new: &str) -> Result<()> {
        self.users.change_password(user_id, old, new)
    }

    /// Drops the account, its follow edges, inbox and history. Its posts stay.
    pub fn delete_account(&mut self, user_id: UserId) -> Result<User> {
        let user = self.users.delete_account(user_id)?;
        self.inboxes.remove(&user_id);
        self.histories.remove(&user_id);
        Ok(user)
    }

    // === Follow graph ===

    pub fn follow(&mut self, follower_id: UserId, target_id: UserId) -> Result<()> {
        follow_user(&mut self.users, follower_id, target_id)?;
        let message = format!("{} started following you", self.username_of(follower_id));
        self.notify(target_id, NotificationType::Follow, follower_id, None, message);
        Ok(())
    }

    pub fn unfollow(&mut self, follower_id: UserId, target_id: UserId) -> Result<()> {
        unfollow_user(&mut self.users, follower_id, target_id)
    }

    pub fn is_following(&self, follower_id: UserId, target_id: UserId) -> bool {
        is_following(&self.users, follower_id, target_id)
    }

    // === Content ===

    pub fn create_post(&mut self, author_id: UserId, content: &str) -> Result<PostId> {
        self.require_user(author_id)?;
        let now = self.clock.now();
        self.posts.create_post(author_id, content, now).map(|p| p.id)
    }

    pub fn edit_post(&mut self, post_id: PostId, requester_id: UserId, content: &str) -> Result<()> {
        self.posts.edit_post(post_id, requester_id, content)
    }

    pub fn delete_post(&mut self, post_id: PostId, requester_id: UserId) -> Result<Post> {
        self.posts.delete_post(post_id, requester_id)
    }

    pub fn like_post(&mut self, post_id: PostId, user_id: UserId) -> Result<u32> {
        self.require_user(user_id)?;
        let likes = self.posts.like_post(post_id, user_id)?;
        if let Some(author_id) = self.posts.find_post(post_id).map(|p| p.author_id) {
            let message = format!("{} liked your post", self.username_of(user_id));
            self.notify(author_id, NotificationType::Like, user_id, Some(post_id), message);
        }
        Ok(likes)
    }

    pub fn unlike_post(&mut self, post_id: PostId, user_id: UserId) -> Result<u32> {
        self.posts.unlike_post(post_id, user_id)
    }

    /// The author is only notified about comments from other people.
    pub fn comment_on_post(&mut self, post_id: PostId, user_id: UserId, content: &str) -> Result<CommentId> {
        self.require_user(user_id)?;
        let now = self.clock.now();
        let comment_id = self.posts.add_comment(post_id, user_id, content, now)?;

        let author_id = self.posts.find_post(post_id).map(|p| p.author_id);
        if let Some(author_id) = author_id.filter(|a| *a != user_id) {
            let message = format!("{} commented on your post", self.username_of(user_id));
            self.notify(author_id, NotificationType::Comment, user_id, Some(post_id), message);
        }
        Ok(comment_id)
    }

    pub fn find_post(&self, post_id: PostId) -> Option<&Post> {
        self.posts.find_post(post_id)
    }

    pub fn feed_for(&self, user_id: UserId) -> Result<Vec<Post>> {
        let user = self.require_user(user_id)?;
        let mut builder = FeedBuilder::new(self.config.feed_limit);
        Ok(builder.build(&user.following, &self.posts).to_vec())
    }

    // === Notifications ===

    pub fn notifications_for(&self, user_id: UserId) -> Vec<Notification> {
        self.inboxes
            .get(&user_id)
            .map(|q| q.peek_all_ordered_by_priority())
            .unwrap_or_default()
    }

    pub fn unread_count(&self, user_id: UserId) -> usize {
        self.inboxes.get(&user_id).map(|q| q.unread_count()).unwrap_or(0)
    }

    /// Consumes the most urgent notification.
    pub fn read_next_notification(&mut self, user_id: UserId) -> Result<Notification> {
        self.inboxes
            .get_mut(&user_id)
            .ok_or(CoreError::QueueEmpty)?
            .extract_and_mark_read()
    }

    pub fn mark_notification_read(&mut self, user_id: UserId, id: NotificationId) -> Result<()> {
        self.inboxes
            .get_mut(&user_id)
            .ok_or(CoreError::NotificationNotFound(id))?
            .mark_read(id)
    }

    pub fn clear_notifications(&mut self, user_id: UserId) {
        if let Some(q) = self.inboxes.get_mut(&user_id) {
            q.clear();
        }
    }

    // === Browsing history ===

    fn history_mut(&mut self, user_id: UserId) -> &mut HistoryStack {
        let capacity = self.config.history_capacity;
        self.histories
            .entry(user_id)
            .or_insert_with(|| HistoryStack::new(capacity))
    }

    /// Records a profile visit and returns the visited account.
    pub fn visit_profile(&mut self, viewer_id: UserId, profile_id: UserId) -> Result<User> {
        self.require_user(viewer_id)?;
        let profile = self.require_user(profile_id)?.clone();
        self.history_mut(viewer_id)
            .push(HistoryEntry::profile(profile.id.to_string(), profile.username.clone()));
        Ok(profile)
    }

    /// Records a post visit; the entry title is the first line of the post,
    /// cut to 40 characters.
    pub fn visit_post(&mut self, viewer_id: UserId, post_id: PostId) -> Result<Post> {
        self.require_user(viewer_id)?;
        let post = self
            .posts
            .find_post(post_id)
            .cloned()
            .ok_or(CoreError::PostNotFound(post_id))?;
        let title: String = post.content.lines().next().unwrap_or("").chars().take(40).collect();
        let author = self.username_of(post.author_id);
        self.history_mut(viewer_id)
            .push(HistoryEntry::post(post.id.to_string(), author, title));
        Ok(post)
    }

    pub fn go_back(&mut self, viewer_id: UserId) -> Result<HistoryEntry> {
        self.histories
            .get_mut(&viewer_id)
            .ok_or(CoreError::HistoryEmpty)?
            .pop()
    }

    pub fn history_for(&self, viewer_id: UserId) -> Vec<HistoryEntry> {
        self.histories
            .get(&viewer_id)
            .map(|h| h.entries().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear_history(&mut self, viewer_id: UserId) {
        if let Some(h) = self.histories.get_mut(&viewer_id) {
            h.clear();
        }
    }

    /// Drops every account, post, inbox and history entry.
    pub fn reset(&mut self) {
        self.users.clear();
        self.posts.clear();
        self.inboxes.clear();
        self.histories.clear();
        info!("all data reset");
    }
}
