//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract (`ProfileStore`) and its SQLite adapter.
//! - Provide the CRUD boundary (`ProfileRepository`) that reports failures
//!   by value instead of leaking store errors.
//!
//! # Invariants
//! - A profile and its address are persisted and removed as one unit.
//! - Repository APIs distinguish bad input, not-found and store failure.

pub mod profile_repo;
pub mod profile_store;
