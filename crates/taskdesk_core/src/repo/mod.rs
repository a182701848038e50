//! Repository layer over the JSON collections of the local store.
//!
//! # Responsibility
//! - Provide record-level operations on top of whole-collection reads and
//!   writes.
//! - Keep key names and encoding inside the store boundary.
//!
//! # Invariants
//! - Every mutation is read-modify-write of exactly one collection.
//! - A failed read never triggers a write.

pub mod credential_repo;
pub mod session_repo;
pub mod task_repo;
pub mod user_repo;
