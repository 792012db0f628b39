pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod models;
pub mod processor;
pub mod routes;
pub mod storage;
pub mod telegram;
