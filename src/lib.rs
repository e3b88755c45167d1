pub use error::HogError;

/// Main architecture layers (dependency flow: CLI → API/Storage → Display)
pub mod cli; // Command-line interface
pub mod storage; // Configuration and credential persistence

/// Support modules (used across layers)
pub mod api; // PostHog API client
pub mod display; // Output formatting
pub mod error; // Error handling
pub mod utils; // Shared utilities and helpers

pub type Result<T> = std::result::Result<T, HogError>;
