//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate mapper, repository and snapshot cache into the five
//!   profile operations.
//! - Keep transports decoupled from storage details.

pub mod profile_service;
