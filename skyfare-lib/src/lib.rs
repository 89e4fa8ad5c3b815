//! Flight search client library
//!
//! The core of the crate is [`table`]: the state of an editable,
//! column-reorderable results table with deferred, batched saves. Around it
//! sit an async client for the Amadeus self-service APIs ([`AmadeusClient`],
//! [`auth`], [`api`]) and a TTL cache that persists search results between
//! sessions ([`cache`], [`store`]).

pub mod api;
pub mod auth;
pub mod cache;
pub mod error;
pub mod model;
pub mod rate_limit;
pub mod response;
pub mod store;
pub mod table;

mod client;

pub use client::*;
pub use response::CacheStatus;
pub use response::SearchResponse;
