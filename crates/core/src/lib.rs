//! # `tradesheet-core`
//!
//! Domain entities, wire envelopes, ports and error types shared by every
//! other crate in the workspace. Nothing in here performs I/O.

pub mod common;
pub mod config;
pub mod gateway;
pub mod journal;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod mock;
