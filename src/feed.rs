use std::collections::HashSet;

use tracing::debug;

use crate::config::DEFAULT_FEED_LIMIT;
use crate::models::models::{Post, UserId};
use crate::posts::ContentStore;

/// Transient view of the newest posts from followed authors. Each build
/// starts from scratch; nothing carries over between builds.
#[derive(Debug, Clone)]
pub struct FeedBuilder {
    limit: usize,
    posts: Vec<Post>,
}

impl Default for FeedBuilder {
    fn default() -> Self {
        FeedBuilder::new(DEFAULT_FEED_LIMIT)
    }
}

impl FeedBuilder {
    pub fn new(limit: usize) -> Self {
        FeedBuilder { limit, posts: Vec::new() }
    }

    /// Single pass over the store, keeping posts whose author is followed in
    /// newest-first order (scan order breaks ties), capped at the limit.
    pub fn build(&mut self, following: &[UserId], store: &ContentStore) -> &[Post] {
        self.posts.clear();
        if following.is_empty() || self.limit == 0 {
            return &self.posts;
        }

        let following: HashSet<UserId> = following.iter().copied().collect();
        for post in store.posts().filter(|p| following.contains(&p.author_id)) {
            let at = self.posts.partition_point(|p| p.created_at >= post.created_at);
            if at >= self.limit {
                continue;
            }
            self.posts.insert(at, post.clone());
            self.posts.truncate(self.limit);
        }

        debug!(posts = self.posts.len(), authors = following.len(), "built feed");
        &self.posts
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// One-shot convenience around [`FeedBuilder::build`].
pub fn build_feed(following: &[UserId], store: &ContentStore, limit: usize) -> Vec<Post> {
    let mut builder = FeedBuilder::new(limit);
    builder.build(following, store);
    builder.posts
}
