use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::core::errors::{CoreError, Result};
use crate::models::models::UserId;
use crate::users::UserRegistry;

/// Adds the edge `follower_id -> target_id` to both users. Every check runs
/// before either side is touched, so a failed call leaves no half edge.
pub fn follow_user(registry: &mut UserRegistry, follower_id: UserId, target_id: UserId) -> Result<()> {
    let follower = registry
        .find_by_id(follower_id)
        .ok_or(CoreError::UserNotFound(follower_id))?;
    if !registry.contains(target_id) {
        return Err(CoreError::UserNotFound(target_id));
    }
    if follower_id == target_id {
        return Err(CoreError::SelfFollow);
    }
    if follower.is_following(target_id) {
        return Err(CoreError::AlreadyFollowing(target_id));
    }

    if let Some(f) = registry.get_mut(follower_id) {
        f.following.push(target_id);
    }
    if let Some(t) = registry.get_mut(target_id) {
        if !t.followers.contains(&follower_id) {
            t.followers.push(follower_id);
        }
    }

    debug!(follower_id, target_id, "followed");
    Ok(())
}

pub fn unfollow_user(registry: &mut UserRegistry, follower_id: UserId, target_id: UserId) -> Result<()> {
    let follower = registry
        .find_by_id(follower_id)
        .ok_or(CoreError::UserNotFound(follower_id))?;
    if !registry.contains(target_id) {
        return Err(CoreError::UserNotFound(target_id));
    }
    if !follower.is_following(target_id) {
        return Err(CoreError::NotFollowing(target_id));
    }

    if let Some(f) = registry.get_mut(follower_id) {
        f.following.retain(|id| *id != target_id);
    }
    if let Some(t) = registry.get_mut(target_id) {
        t.followers.retain(|id| *id != follower_id);
    }

    debug!(follower_id, target_id, "unfollowed");
    Ok(())
}

/// False when either user is unknown.
pub fn is_following(registry: &UserRegistry, follower_id: UserId, target_id: UserId) -> bool {
    registry
        .find_by_id(follower_id)
        .map(|u| u.is_following(target_id))
        .unwrap_or(false)
}

pub fn get_followings(registry: &UserRegistry, user_id: UserId) -> Result<Vec<UserId>> {
    registry
        .find_by_id(user_id)
        .map(|u| u.following.clone())
        .ok_or(CoreError::UserNotFound(user_id))
}

pub fn get_followers(registry: &UserRegistry, user_id: UserId) -> Result<Vec<UserId>> {
    registry
        .find_by_id(user_id)
        .map(|u| u.followers.clone())
        .ok_or(CoreError::UserNotFound(user_id))
}

/// Repairs follow sets after a bulk load: drops self edges, duplicates and
/// edges to unknown users, then mirrors any edge recorded on only one side.
/// Returns the number of changes made.
pub fn reconcile_follow_graph(registry: &mut UserRegistry) -> usize {
    let known: BTreeSet<UserId> = registry.users.keys().copied().collect();
    let mut repairs = 0;

    for user in registry.users.values_mut() {
        let id = user.id;
        for list in [&mut user.following, &mut user.followers] {
            let before = list.len();
            let mut seen = HashSet::new();
            list.retain(|other| *other != id && known.contains(other) && seen.insert(*other));
            repairs += before - list.len();
        }
    }

    let mut edges = Vec::new();
    for user in registry.users.values() {
        edges.extend(user.following.iter().map(|target| (user.id, *target)));
        edges.extend(user.followers.iter().map(|follower| (*follower, user.id)));
    }
    for (follower_id, target_id) in edges {
        if let Some(f) = registry.users.get_mut(&follower_id) {
            if !f.following.contains(&target_id) {
                f.following.push(target_id);
                repairs += 1;
            }
        }
        if let Some(t) = registry.users.get_mut(&target_id) {
            if !t.followers.contains(&follower_id) {
                t.followers.push(follower_id);
                repairs += 1;
            }
        }
    }

    if repairs > 0 {
        warn!(repairs, "follow graph needed repairs after load");
    }
    repairs
}
