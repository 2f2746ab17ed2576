//! Logify - Shopify webhook receiver.
//!
//! This library backs two binaries:
//! - `logify-web`: authenticates Shopify webhooks and mirrors customers and
//!   shops into SQLite
//! - `logify-sign`: signs a body the way Shopify does, for manual testing
//!
//! ## Architecture
//!
//! ```text
//! Shopify → router → validate_webhook → receive → Synchronizer → SQLite
//! ```

pub mod config;
pub mod store;
pub mod sync;
pub mod topic;
pub mod web;

// Re-export commonly used types
pub use config::{Config, DuplicatePolicy, SharedSecret};
pub use store::Database;
pub use sync::{SyncError, SyncOutcome, Synchronizer};
pub use topic::Topic;
pub use web::{router, AppState, WebhookAuthenticator};
