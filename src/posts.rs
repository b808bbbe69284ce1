use tracing::{debug, info};

use crate::config::FIRST_POST_ID;
use crate::core::errors::{CoreError, Result};
use crate::core::helpers::validate_post_content;
use crate::models::models::{Comment, CommentId, Post, PostId, Timestamp, UserId};

#[derive(Debug, Clone)]
struct PostNode {
    post: Post,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Posts kept newest-first in a doubly linked list threaded through an arena.
/// Freed slots are recycled; handles never leave this module.
#[derive(Debug, Clone)]
pub struct ContentStore {
    slots: Vec<Option<PostNode>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    next_post_id: PostId,
}

impl Default for ContentStore {
    fn default() -> Self {
        ContentStore::new()
    }
}

/// Newest-first walk over the list.
pub struct Posts<'a> {
    store: &'a ContentStore,
    cursor: Option<usize>,
}

impl<'a> Iterator for Posts<'a> {
    type Item = &'a Post;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.store.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.post)
    }
}

impl ContentStore {
    pub fn new() -> Self {
        ContentStore {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            next_post_id: FIRST_POST_ID,
        }
    }

    fn node(&self, idx: usize) -> Option<&PostNode> {
        self.slots.get(idx).and_then(|s| s.as_ref())
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut PostNode> {
        self.slots.get_mut(idx).and_then(|s| s.as_mut())
    }

    fn allocate(&mut self, post: Post) -> usize {
        let node = PostNode { post, prev: None, next: None };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Splices `idx` in front of `before`, or at the tail when `before` is None.
    fn link_before(&mut self, idx: usize, before: Option<usize>) {
        let prev = match before {
            Some(b) => self.node(b).and_then(|n| n.prev),
            None => self.tail,
        };

        if let Some(node) = self.node_mut(idx) {
            node.prev = prev;
            node.next = before;
        }
        match prev {
            Some(p) => {
                if let Some(n) = self.node_mut(p) {
                    n.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        match before {
            Some(b) => {
                if let Some(n) = self.node_mut(b) {
                    n.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }
        self.len += 1;
    }

    fn unlink(&mut self, idx: usize) -> Option<Post> {
        let node = self.slots.get_mut(idx)?.take()?;

        match node.prev {
            Some(p) => {
                if let Some(n) = self.node_mut(p) {
                    n.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => {
                if let Some(nn) = self.node_mut(n) {
                    nn.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }

        self.free.push(idx);
        self.len -= 1;
        Some(node.post)
    }

    /// First node that `created_at` should be placed in front of. With
    /// `ahead_of_equals` a new record goes before older records carrying the
    /// same timestamp, otherwise after them.
    fn insertion_point(&self, created_at: &Timestamp, ahead_of_equals: bool) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node(idx)?;
            let stop = if ahead_of_equals {
                node.post.created_at <= *created_at
            } else {
                node.post.created_at < *created_at
            };
            if stop {
                return Some(idx);
            }
            cursor = node.next;
        }
        None
    }

    fn index_of(&self, post_id: PostId) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node(idx)?;
            if node.post.id == post_id {
                return Some(idx);
            }
            cursor = node.next;
        }
        None
    }

    fn post_mut(&mut self, post_id: PostId) -> Result<&mut Post> {
        let idx = self.index_of(post_id).ok_or(CoreError::PostNotFound(post_id))?;
        self.node_mut(idx)
            .map(|n| &mut n.post)
            .ok_or(CoreError::PostNotFound(post_id))
    }

    /// The new post lands ahead of every post with the same or an older
    /// timestamp.
    pub fn create_post(&mut self, author_id: UserId, content: &str, created_at: Timestamp) -> Result<&Post> {
        validate_post_content(content)?;

        let id = self.next_post_id;
        let next_post_id = id.checked_add(1).ok_or(CoreError::IdsExhausted)?;
        let post = Post {
            id,
            author_id,
            content: content.to_string(),
            created_at,
            like_count: 0,
            comments: Vec::new(),
        };
        self.next_post_id = next_post_id;

        let before = self.insertion_point(&created_at, true);
        let idx = self.allocate(post);
        self.link_before(idx, before);

        info!(post_id = id, author_id, "created post");
        self.node(idx)
            .map(|n| &n.post)
            .ok_or(CoreError::PostNotFound(id))
    }

    /// Checks run in the order existence, ownership, content.
    pub fn edit_post(&mut self, post_id: PostId, requester_id: UserId, new_content: &str) -> Result<()> {
        let post = self.post_mut(post_id)?;
        if post.author_id != requester_id {
            return Err(CoreError::NotOwner);
        }
        validate_post_content(new_content)?;

        if post.content != new_content {
            post.content = new_content.to_string();
            debug!(post_id, "edited post");
        }
        Ok(())
    }

    /// Removes the post together with its comments.
    pub fn delete_post(&mut self, post_id: PostId, requester_id: UserId) -> Result<Post> {
        let idx = self.index_of(post_id).ok_or(CoreError::PostNotFound(post_id))?;
        let owner = self.node(idx).map(|n| n.post.author_id);
        if owner != Some(requester_id) {
            return Err(CoreError::NotOwner);
        }

        let post = self.unlink(idx).ok_or(CoreError::PostNotFound(post_id))?;
        info!(post_id, comments = post.comments.len(), "deleted post");
        Ok(post)
    }

    pub fn like_post(&mut self, post_id: PostId, requester_id: UserId) -> Result<u32> {
        let post = self.post_mut(post_id)?;
        if post.author_id == requester_id {
            return Err(CoreError::SelfLike);
        }
        post.like_count = post.like_count.checked_add(1).ok_or(CoreError::TooManyLikes)?;
        Ok(post.like_count)
    }

    pub fn unlike_post(&mut self, post_id: PostId, _requester_id: UserId) -> Result<u32> {
        let post = self.post_mut(post_id)?;
        if post.like_count == 0 {
            return Err(CoreError::NoLikesToRemove);
        }
        post.like_count -= 1;
        Ok(post.like_count)
    }

    /// Appends to the end of the post's comments. Existence is checked before
    /// content.
    pub fn add_comment(
        &mut self,
        post_id: PostId,
        author_id: UserId,
        content: &str,
        created_at: Timestamp,
    ) -> Result<CommentId> {
        let post = self.post_mut(post_id)?;
        if content.is_empty() {
            return Err(CoreError::EmptyContent);
        }

        let id = post.next_comment_id().ok_or(CoreError::IdsExhausted)?;
        post.comments.push(Comment {
            id,
            author_id,
            content: content.to_string(),
            created_at,
        });
        Ok(id)
    }

    /// Linear walk from the newest post.
    pub fn find_post(&self, post_id: PostId) -> Option<&Post> {
        self.index_of(post_id)
            .and_then(|idx| self.node(idx))
            .map(|n| &n.post)
    }

    pub fn posts(&self) -> Posts<'_> {
        Posts { store: self, cursor: self.head }
    }

    pub fn posts_by(&self, author_id: UserId) -> impl Iterator<Item = &Post> + '_ {
        self.posts().filter(move |p| p.author_id == author_id)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next_post_id(&self) -> PostId {
        self.next_post_id
    }

    /// Restores posts with known ids. Input is expected newest-first (the
    /// order `posts()` yields); records with equal timestamps keep their input
    /// order. The next id becomes one past the largest id seen.
    pub fn bulk_load(&mut self, posts: impl IntoIterator<Item = Post>) -> Result<usize> {
        let mut loaded = 0;
        for post in posts {
            if self.index_of(post.id).is_some() {
                return Err(CoreError::DuplicateId(post.id));
            }
            let after = post.id.checked_add(1).ok_or(CoreError::IdsExhausted)?;
            self.next_post_id = self.next_post_id.max(after);

            let before = self.insertion_point(&post.created_at, false);
            let idx = self.allocate(post);
            self.link_before(idx, before);
            loaded += 1;
        }
        debug!(loaded, next_post_id = self.next_post_id, "bulk loaded posts");
        Ok(loaded)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
        self.next_post_id = FIRST_POST_ID;
    }
}
