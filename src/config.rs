use std::path::PathBuf;
use std::str::FromStr;

use crate::models::models::{PostId, UserId};

pub const FIRST_USER_ID: UserId = 1001;
pub const FIRST_POST_ID: PostId = 1001;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 20;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_BIO_LENGTH: usize = 256;
pub const MAX_POST_LENGTH: usize = 280;

pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 200;
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;
pub const DEFAULT_FEED_LIMIT: usize = 20;
pub const DEFAULT_DATA_FILE: &str = "chatter.json";

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Argon2 cost parameters used when storing credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl HashCost {
    /// Smallest cost argon2 accepts. Only meant for tests and throwaway data.
    pub const fn minimal() -> Self {
        HashCost { memory_kib: 8, iterations: 1 }
    }
}

impl Default for HashCost {
    fn default() -> Self {
        HashCost {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub notification_capacity: usize,
    pub history_capacity: usize,
    pub feed_limit: usize,
    pub data_file: PathBuf,
    pub hash_cost: HashCost,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            feed_limit: DEFAULT_FEED_LIMIT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            hash_cost: HashCost::default(),
        }
    }
}

impl Config {
    /// Reads `CHATTER_*` variables, falling back to the defaults for anything
    /// missing or unparseable.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            notification_capacity: env_or(
                "CHATTER_NOTIFICATION_CAPACITY",
                defaults.notification_capacity,
            )
            .max(1),
            history_capacity: env_or("CHATTER_HISTORY_CAPACITY", defaults.history_capacity).max(1),
            feed_limit: env_or("CHATTER_FEED_LIMIT", defaults.feed_limit),
            data_file: std::env::var("CHATTER_DATA_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_file),
            hash_cost: HashCost {
                memory_kib: env_or("CHATTER_HASH_MEMORY_KIB", defaults.hash_cost.memory_kib),
                iterations: env_or("CHATTER_HASH_ITERATIONS", defaults.hash_cost.iterations),
            },
        }
    }

    /// Default limits with the cheapest credential hashing.
    pub fn lightweight() -> Self {
        Config {
            hash_cost: HashCost::minimal(),
            ..Config::default()
        }
    }
}
