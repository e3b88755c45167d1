//! PostHog API layer: the HTTP client core and the wire models it
//! deserializes into.

pub mod client;
pub mod models;

pub use client::PostHogClient;
