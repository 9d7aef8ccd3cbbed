//! # Feed Monitor Core
//!
//! Shared, I/O-free logic for Feed Monitor: feed item models, keyword
//! relevance scoring, processed-item state, and the state store trait.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. The
//! `feed-monitor` crate supplies feed fetching, the JSON file store, and
//! the CLI on top of it.

pub mod keywords;
pub mod models;
pub mod state;
pub mod store;
