//! In-memory caching for the profile read paths.

pub mod snapshot;
