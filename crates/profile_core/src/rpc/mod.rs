//! Remote-procedure surface: wire messages and entity mapping.
//!
//! # Responsibility
//! - Define request/reply shapes for the five profile operations.
//! - Convert between wire profiles and storage entities.
//!
//! # Invariants
//! - Every reply carries an explicit status code.

pub mod mapper;
pub mod messages;
