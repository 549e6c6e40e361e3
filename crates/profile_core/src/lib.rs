//! Core logic for the profile record service.
//!
//! Profiles and their addresses live in SQLite; reads are served from a
//! snapshot of all profiles that every successful mutation discards.

pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod rpc;
pub mod service;

pub use cache::snapshot::{SnapshotCache, DEFAULT_SNAPSHOT_TTL};
pub use config::{ConfigError, ServiceConfig};
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::profile::{AddressEntity, ProfileEntity, ProfileId};
pub use repo::profile_repo::{ErrorKind, ProfileRepository, RepoError, RepoResult};
pub use repo::profile_store::{
    DeleteOutcome, ProfileStore, SqliteProfileStore, StoreError, StoreResult,
};
pub use rpc::mapper::{to_entity, to_model, update_entity, MapError};
pub use rpc::messages::{
    status, CreateProfileRequest, DeleteProfileRequest, GetProfileByIdReply,
    GetProfileByIdRequest, ProfilesReply, RpcReply, RpcRequest, UpdateProfileRequest, UserProfile,
    UserProfileReply,
};
pub use service::profile_service::{ProfileService, ServiceInitError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
