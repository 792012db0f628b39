//! Redis storage layer for users, session tokens, calendars and bot state.
//!
//! All functions are async and use redis::AsyncCommands.
//! Data is serialized to JSON for storage in Redis.

pub mod calendar;
pub mod session;
pub mod settings;
pub mod user;

/// Map a serde_json error into a RedisError so storage functions expose a
/// single error type.
pub(crate) fn json_error(err: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((
        redis::ErrorKind::TypeError,
        "JSON serialize/deserialize",
        err.to_string(),
    ))
}
