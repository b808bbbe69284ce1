use tracing::debug;

use crate::core::errors::{CoreError, Result};
use crate::core::helpers::{hash_password, verify_password};
use crate::models::models::{User, UserId};
use crate::users::{validate_password, UserRegistry};

impl UserRegistry {
    /// Unknown usernames and wrong passwords are reported separately; both
    /// are safe to retry.
    pub fn login(&self, username: &str, password: &str) -> Result<&User> {
        let user = self
            .find_by_username(username)
            .ok_or_else(|| CoreError::UnknownUsername(username.to_string()))?;

        if !verify_password(password, &user.password) {
            debug!(user_id = user.id, "login rejected");
            return Err(CoreError::WrongPassword);
        }
        Ok(user)
    }

    pub fn change_password(&mut self, id: UserId, old_password: &str, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        let cost = self.hash_cost;

        let user = self.get_mut(id).ok_or(CoreError::UserNotFound(id))?;
        if !verify_password(old_password, &user.password) {
            return Err(CoreError::WrongPassword);
        }
        user.password = hash_password(new_password, cost)?;
        debug!(user_id = id, "password changed");
        Ok(())
    }
}
