//! HTTP request handlers.

pub mod activity;
pub mod assignments;
pub mod clients;
pub mod dashboard;
pub mod directory;
pub mod health;
pub mod pipeline;
pub mod users;
