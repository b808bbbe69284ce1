use std::sync::Mutex;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use chrono::{Duration, NaiveDateTime};
use rand::rngs::OsRng;

use crate::config::{HashCost, MAX_POST_LENGTH};
use crate::core::errors::{CoreError, Result};
use crate::models::models::Timestamp;

/// Source of "current time" for everything that stamps records.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_naive(&chrono::Local::now().naive_local())
    }
}

/// Deterministic clock. Every call to `now` returns the current reading and
/// then moves it forward by `step`.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<NaiveDateTime>,
    step: Duration,
}

impl ManualClock {
    /// Falls back to 2025-01-01 00:00:00 when `start` is not a real date.
    pub fn new(start: Timestamp, step_seconds: i64) -> Self {
        let start = start.to_naive().unwrap_or_else(|| {
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default()
        });
        ManualClock {
            current: Mutex::new(start),
            step: Duration::seconds(step_seconds),
        }
    }

    pub fn set(&self, ts: Timestamp) {
        if let Some(dt) = ts.to_naive() {
            *self.lock() = dt;
        }
    }

    pub fn advance(&self, seconds: i64) {
        let mut current = self.lock();
        *current += Duration::seconds(seconds);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut current = self.lock();
        let reading = Timestamp::from_naive(&current);
        *current += self.step;
        reading
    }
}

fn argon2_with(cost: HashCost) -> Result<Argon2<'static>> {
    let params = Params::new(cost.memory_kib, cost.iterations, Params::DEFAULT_P_COST, None)
        .map_err(|e| CoreError::CredentialHashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(password: &str, cost: HashCost) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    argon2_with(cost)?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::CredentialHashing(e.to_string()))
}

/// The cost parameters are read back out of the PHC string, so hashes made
/// under any configuration keep verifying.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Emptiness is checked before length.
pub fn validate_post_content(content: &str) -> Result<()> {
    if content.is_empty() {
        return Err(CoreError::EmptyContent);
    }
    let len = char_len(content);
    if len > MAX_POST_LENGTH {
        return Err(CoreError::ContentTooLong { len });
    }
    Ok(())
}
