//! Bounded priority inbox.
//!
//! Notifications live in a binary min-heap stored in a `Vec`. Priority is the
//! notification type first (comments, then likes, then follows) and the
//! creation time second, earliest first. The queue never grows past its
//! capacity; inserts into a full queue are refused.

use tracing::warn;

use crate::config::DEFAULT_NOTIFICATION_CAPACITY;
use crate::core::errors::{CoreError, Result};
use crate::models::models::{Notification, NotificationId, NotificationType, PostId, Timestamp, UserId};

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn left_child(i: usize) -> usize {
    2 * i + 1
}

fn right_child(i: usize) -> usize {
    2 * i + 2
}

#[derive(Debug, Clone)]
pub struct NotificationQueue {
    heap: Vec<Notification>,
    capacity: usize,
    next_id: NotificationId,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        NotificationQueue::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> Self {
        NotificationQueue {
            heap: Vec::new(),
            capacity,
            next_id: 1,
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 && self.heap[index].has_higher_priority(&self.heap[parent(index)]) {
            self.heap.swap(index, parent(index));
            index = parent(index);
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let size = self.heap.len();
        loop {
            let mut smallest = index;
            let left = left_child(index);
            let right = right_child(index);

            if left < size && self.heap[left].has_higher_priority(&self.heap[smallest]) {
                smallest = left;
            }
            if right < size && self.heap[right].has_higher_priority(&self.heap[smallest]) {
                smallest = right;
            }
            if smallest == index {
                return;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }

    fn push_heap(&mut self, notification: Notification) {
        self.heap.push(notification);
        let last = self.heap.len() - 1;
        self.sift_up(last);
    }

    fn pop_heap(&mut self) -> Option<Notification> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    pub fn insert(
        &mut self,
        kind: NotificationType,
        source_user_id: UserId,
        related_post_id: Option<PostId>,
        message: &str,
        created_at: Timestamp,
    ) -> Result<NotificationId> {
        if self.heap.len() >= self.capacity {
            warn!(capacity = self.capacity, kind = kind.label(), "notification queue full");
            return Err(CoreError::QueueFull { capacity: self.capacity });
        }

        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(CoreError::IdsExhausted)?;
        self.push_heap(Notification {
            id,
            kind,
            source_user_id,
            related_post_id,
            message: message.to_string(),
            created_at,
            is_read: false,
        });
        Ok(id)
    }

    /// Every queued notification in delivery order. Works on a scratch copy,
    /// so the queue itself is untouched.
    pub fn peek_all_ordered_by_priority(&self) -> Vec<Notification> {
        let mut scratch = self.clone();
        let mut ordered = Vec::with_capacity(scratch.len());
        while let Some(n) = scratch.pop_heap() {
            ordered.push(n);
        }
        ordered
    }

    pub fn peek(&self) -> Option<&Notification> {
        self.heap.first()
    }

    /// Removes the highest-priority notification and hands it back marked as
    /// read. It is not put back.
    pub fn extract_and_mark_read(&mut self) -> Result<Notification> {
        let mut top = self.pop_heap().ok_or(CoreError::QueueEmpty)?;
        top.is_read = true;
        Ok(top)
    }

    /// Alias of [`extract_and_mark_read`](Self::extract_and_mark_read).
    pub fn mark_top_as_read(&mut self) -> Result<Notification> {
        self.extract_and_mark_read()
    }

    /// Flags one notification as read and leaves it queued. The flag takes no
    /// part in ordering, so the heap stays valid.
    pub fn mark_read(&mut self, id: NotificationId) -> Result<()> {
        let n = self
            .heap
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(CoreError::NotificationNotFound(id))?;
        n.is_read = true;
        Ok(())
    }

    pub fn unread_count(&self) -> usize {
        self.heap.iter().filter(|n| !n.is_read).count()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rebuilds from previously saved notifications, keeping their ids and
    /// read flags. Anything past capacity is dropped; an id with no successor
    /// is refused.
    pub fn restore(&mut self, items: impl IntoIterator<Item = Notification>) -> Result<usize> {
        let mut restored = 0;
        for n in items {
            if self.heap.len() >= self.capacity {
                warn!(capacity = self.capacity, "dropping notifications beyond capacity");
                break;
            }
            let after = n.id.checked_add(1).ok_or(CoreError::IdsExhausted)?;
            self.next_id = self.next_id.max(after);
            self.push_heap(n);
            restored += 1;
        }
        Ok(restored)
    }

    /// True when every parent outranks or ties both of its children.
    pub fn is_valid_heap(&self) -> bool {
        (1..self.heap.len()).all(|i| !self.heap[i].has_higher_priority(&self.heap[parent(i)]))
    }
}
