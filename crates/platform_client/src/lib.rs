//! Typed, rate-limited accessor for the remote actor platform's REST API.
//!
//! Pure I/O: every method maps to one endpoint and carries no fallback
//! policy. Callers are written against [`ActorPlatform`] so they can be
//! driven by a scripted platform in tests.

pub mod api;
mod error;
mod platform;

pub use api::client::PlatformClient;
pub use api::models::User;
pub use error::ClientError;
pub use platform::{ActorPlatform, ActorScope};
