//! # `tradesheet-gateway` - remote data gateway
//!
//! Talks to a user-deployed Google Apps Script that fronts a spreadsheet.
//!
//! ## Layout
//! - `normalize`: coerces loose spreadsheet rows into typed records
//! - `registry`: pending-call bookkeeping for the cross-origin channel
//! - `jsonp` / `relay`: the two `Transport` implementations
//! - `client`: `SheetsClient`, one typed method per action
//! - `remote` / `proxy`: the server-side half that holds the live endpoint

pub mod client;
mod http;
pub mod jsonp;
pub mod normalize;
pub mod proxy;
pub mod registry;
pub mod relay;
pub mod remote;
