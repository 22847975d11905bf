//! NodeBB forum integration.
//!
//! Builds a topic from a verified GitHub delivery and creates it through the
//! NodeBB write API (`POST /api/v3/topics`).

pub mod notifier;
pub mod post;

pub use notifier::{ForumNotifier, NotifierSetupError, NotifyError};
pub use post::{sender_login, ForumPost};
