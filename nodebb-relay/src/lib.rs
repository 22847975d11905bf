//! NodeBB relay - forwards GitHub webhook deliveries to a NodeBB forum.
//!
//! ## Flow
//!
//! ```text
//! GitHub → POST /webhook/github → signature check → NodeBB POST /api/v3/topics
//! ```

pub mod config;
pub mod delivery;
pub mod error;
pub mod forum;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use delivery::{VerifiedPayload, WebhookDelivery};
pub use error::RelayError;
pub use forum::{ForumNotifier, ForumPost, NotifierSetupError, NotifyError};
pub use web::{router, AppState};
