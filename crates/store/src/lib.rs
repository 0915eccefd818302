//! Settings persistence for the relay backend.
//!
//! [`settings::SqliteSettingsStore`] keeps the singleton settings row in
//! `settings.db` under the configured data directory;
//! [`memory::MemorySettingsStore`] keeps it in process memory.

pub mod config;
pub mod memory;
pub mod settings;
