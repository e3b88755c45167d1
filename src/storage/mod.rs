//! Storage layer: the credential store file and identity resolution.
//!
//! One JSON file holds every named account profile plus the default account
//! name. It is read once at startup and written at most once per command.

pub mod config;

pub use config::{Account, Config, ResolvedAccount, ResolvedProject};
