//! Storage-side domain model for profile records.
//!
//! # Responsibility
//! - Define the entity shapes persisted by the store adapter.
//! - Keep storage records free of wire/transport concerns.
//!
//! # Invariants
//! - Every domain object is identified by a stable, caller-supplied `id`.
//! - A profile owns exactly one address keyed by the same id.

pub mod profile;
