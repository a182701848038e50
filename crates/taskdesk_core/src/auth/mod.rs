//! Authentication session state and its manager.
//!
//! # Responsibility
//! - Model session state as `Loading | Anonymous | Authenticated(User)`.
//! - Drive every transition through one pure `reduce` function.
//! - Persist and restore the session through the local store.

pub mod session;
pub mod state;
