use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::config::*;
use crate::core::errors::{CoreError, Result};
use crate::core::helpers::{char_len, hash_password};
use crate::models::models::{User, UserId};

/// Accounts keyed by id, with a username index for uniqueness checks and
/// lookups. Iteration is always ascending by id.
#[derive(Debug, Clone)]
pub struct UserRegistry {
    pub(crate) users: BTreeMap<UserId, User>,
    by_username: HashMap<String, UserId>,
    next_id: UserId,
    pub(crate) hash_cost: HashCost,
}

impl Default for UserRegistry {
    fn default() -> Self {
        UserRegistry::new(HashCost::default())
    }
}

fn validate_username(username: &str) -> Result<()> {
    let len = char_len(username);
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(CoreError::InvalidUsername);
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<()> {
    if char_len(password) < MIN_PASSWORD_LENGTH {
        return Err(CoreError::WeakPassword);
    }
    Ok(())
}

fn validate_bio(bio: &str) -> Result<()> {
    if char_len(bio) > MAX_BIO_LENGTH {
        return Err(CoreError::BioTooLong);
    }
    Ok(())
}

impl UserRegistry {
    pub fn new(hash_cost: HashCost) -> Self {
        UserRegistry {
            users: BTreeMap::new(),
            by_username: HashMap::new(),
            next_id: FIRST_USER_ID,
            hash_cost,
        }
    }

    /// Length rules are checked before the (case-sensitive) uniqueness check.
    pub fn register(&mut self, username: &str, password: &str, bio: &str) -> Result<&User> {
        validate_username(username)?;
        validate_password(password)?;
        validate_bio(bio)?;

        if self.by_username.contains_key(username) {
            return Err(CoreError::UsernameTaken(username.to_string()));
        }

        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(CoreError::IdsExhausted)?;
        let user = User {
            id,
            username: username.to_string(),
            password: hash_password(password, self.hash_cost)?,
            bio: bio.to_string(),
            following: Vec::new(),
            followers: Vec::new(),
        };
        self.next_id = next_id;

        info!(user_id = id, username, "registered user");
        self.by_username.insert(user.username.clone(), id);
        Ok(self.users.entry(id).or_insert(user))
    }

    pub fn find_by_id(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.by_username
            .get(username)
            .and_then(|id| self.users.get(id))
    }

    /// Ascending id order.
    pub fn list_all(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    /// Accounts whose username contains `term`, ignoring case, in ascending
    /// id order. An empty term matches everyone.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a User> + 'a {
        let needle = term.to_lowercase();
        self.users
            .values()
            .filter(move |u| u.username.to_lowercase().contains(&needle))
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Id the next registration will receive.
    pub fn next_id(&self) -> UserId {
        self.next_id
    }

    pub fn update_bio(&mut self, id: UserId, bio: &str) -> Result<()> {
        validate_bio(bio)?;
        let user = self.users.get_mut(&id).ok_or(CoreError::UserNotFound(id))?;
        user.bio = bio.to_string();
        Ok(())
    }

    /// Removes the account and every follow edge that mentions it. The id is
    /// never handed out again, so posts that reference it stay unambiguous.
    pub fn delete_account(&mut self, id: UserId) -> Result<User> {
        let user = self.users.remove(&id).ok_or(CoreError::UserNotFound(id))?;
        self.by_username.remove(&user.username);

        for other in user.following.iter().chain(user.followers.iter()) {
            if let Some(u) = self.users.get_mut(other) {
                u.followers.retain(|f| *f != id);
                u.following.retain(|f| *f != id);
            }
        }

        info!(user_id = id, username = %user.username, "deleted account");
        Ok(user)
    }

    /// Inserts records that already carry ids (and hashed credentials), e.g.
    /// from a snapshot. Afterwards the next id is one past the largest id seen.
    pub fn bulk_load(&mut self, users: impl IntoIterator<Item = User>) -> Result<usize> {
        let mut loaded = 0;
        for user in users {
            if self.users.contains_key(&user.id) {
                return Err(CoreError::DuplicateId(user.id));
            }
            if self.by_username.contains_key(&user.username) {
                return Err(CoreError::UsernameTaken(user.username));
            }
            let after = user.id.checked_add(1).ok_or(CoreError::IdsExhausted)?;
            self.next_id = self.next_id.max(after);
            self.by_username.insert(user.username.clone(), user.id);
            self.users.insert(user.id, user);
            loaded += 1;
        }
        debug!(loaded, next_id = self.next_id, "bulk loaded users");
        Ok(loaded)
    }

    pub fn clear(&mut self) {
        self.users.clear();
        self.by_username.clear();
        self.next_id = FIRST_USER_ID;
    }

    pub(crate) fn get_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }
}
