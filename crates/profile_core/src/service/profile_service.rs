//! Profile use-case service: RPC handlers over a cache-coherent read path.
//!
//! # Responsibility
//! - Serve `get_profile_by_id` and `get_all_profiles` from the snapshot when
//!   it is valid, rebuilding it from the repository otherwise.
//! - Route create/update/delete through mapper and repository and
//!   invalidate the snapshot after every successful mutation.
//! - Convert every outcome into a reply with an explicit status code.
//!
//! # Invariants
//! - The snapshot is never patched; mutations only discard it.
//! - A failed rebuild leaves the snapshot empty so the next read retries.
//! - Handlers never panic and never leak store errors.
//!
//! Concurrent requests are not serialized here. A rebuild racing an
//! invalidation can repopulate the snapshot with rows read before the
//! mutation committed; that staleness lasts until the next mutation or TTL
//! expiry.

use crate::cache::snapshot::SnapshotCache;
use crate::config::{ConfigError, ServiceConfig};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::profile::ProfileEntity;
use crate::repo::profile_repo::{ErrorKind, ProfileRepository, RepoError};
use crate::repo::profile_store::{ProfileStore, SqliteProfileStore};
use crate::rpc::mapper::{to_entity, to_model, update_entity};
use crate::rpc::messages::{
    status, CreateProfileRequest, DeleteProfileRequest, GetProfileByIdReply,
    GetProfileByIdRequest, ProfilesReply, RpcReply, RpcRequest, UpdateProfileRequest,
    UserProfileReply,
};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failure while assembling a service from configuration.
#[derive(Debug)]
pub enum ServiceInitError {
    Config(ConfigError),
    Db(DbError),
}

impl Display for ServiceInitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Db(err) => write!(f, "profile database unavailable: {err}"),
        }
    }
}

impl Error for ServiceInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ServiceInitError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for ServiceInitError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Profile service shared by all inbound calls.
///
/// `Send + Sync` whenever the store is; wrap in `Arc` to share across
/// threads.
pub struct ProfileService<S: ProfileStore> {
    repo: ProfileRepository<S>,
    cache: SnapshotCache,
}

impl ProfileService<SqliteProfileStore> {
    /// Opens the configured SQLite database and wires store, repository and
    /// snapshot cache.
    pub fn open(config: &ServiceConfig) -> Result<Self, ServiceInitError> {
        config.validate()?;
        let conn = match &config.db_path {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        let store = SqliteProfileStore::try_new(conn)?;
        Ok(Self::with_cache(
            ProfileRepository::new(store),
            SnapshotCache::new(config.snapshot_ttl),
        ))
    }
}

impl<S: ProfileStore> ProfileService<S> {
    /// Creates a service with the default snapshot TTL.
    pub fn new(store: S) -> Self {
        Self::with_cache(ProfileRepository::new(store), SnapshotCache::default())
    }

    pub fn with_cache(repo: ProfileRepository<S>, cache: SnapshotCache) -> Self {
        Self { repo, cache }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Dispatches one framed request to its handler.
    pub fn handle(&self, request: &RpcRequest) -> RpcReply {
        match request {
            RpcRequest::CreateProfile(request) => RpcReply::Status(self.create_profile(request)),
            RpcRequest::GetProfileById(request) => {
                RpcReply::Profile(self.get_profile_by_id(request))
            }
            RpcRequest::GetAllProfiles => RpcReply::Profiles(self.get_all_profiles()),
            RpcRequest::UpdateProfile(request) => RpcReply::Status(self.update_profile(request)),
            RpcRequest::DeleteProfile(request) => RpcReply::Status(self.delete_profile(request)),
        }
    }

    /// 201 on success, 400 for an absent/blank profile, 500 on store failure.
    pub fn create_profile(&self, request: &CreateProfileRequest) -> UserProfileReply {
        let Some(entity) = to_entity(request.profile.as_ref()) else {
            return UserProfileReply::new(status::BAD_REQUEST, "Bad request");
        };

        match self.repo.create_profile(Some(&entity)) {
            Ok(()) => {
                self.cache.invalidate();
                UserProfileReply::new(status::CREATED, "User profile created")
            }
            Err(err) => failure_reply(&err, "create"),
        }
    }

    /// 200 with the profile, 400 for a blank id, 404 when unknown, 500 when
    /// the stored record cannot be mapped.
    pub fn get_profile_by_id(&self, request: &GetProfileByIdRequest) -> GetProfileByIdReply {
        let id = request.user_id.as_str();
        if id.trim().is_empty() {
            return GetProfileByIdReply::status(status::BAD_REQUEST);
        }

        let Some(entity) = self.find_profile(id) else {
            return GetProfileByIdReply::status(status::NOT_FOUND);
        };

        match to_model(&entity) {
            Ok(profile) => GetProfileByIdReply::found(profile),
            Err(err) => {
                error!("event=profile_get module=service status=error id={id} error={err}");
                GetProfileByIdReply::status(status::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// All profiles; an empty list when none exist or the store is down.
    pub fn get_all_profiles(&self) -> ProfilesReply {
        let profiles = self
            .all_profiles()
            .iter()
            .filter_map(|entity| match to_model(entity) {
                Ok(profile) => Some(profile),
                Err(err) => {
                    warn!(
                        "event=profile_list module=service status=skip id={} error={}",
                        entity.id, err
                    );
                    None
                }
            })
            .collect();
        ProfilesReply { profiles }
    }

    /// 200 on success, 400 for an absent profile, 404 when the target does
    /// not exist, 500 on store failure. The id of an existing profile is
    /// never changed.
    pub fn update_profile(&self, request: &UpdateProfileRequest) -> UserProfileReply {
        let Some(profile) = request.profile.as_ref() else {
            return UserProfileReply::new(status::BAD_REQUEST, "Bad request");
        };

        let existing = match self.repo.get_profile_by_id(&profile.user_id) {
            Ok(existing) => existing,
            Err(err) if err.kind() == ErrorKind::StoreFailure => {
                return failure_reply(&err, "update");
            }
            Err(_) => return UserProfileReply::new(status::NOT_FOUND, "Not found"),
        };

        let updated = update_entity(Some(profile), existing);
        match self.repo.update_profile(updated.as_ref()) {
            Ok(()) => {
                self.cache.invalidate();
                UserProfileReply::new(status::OK, "User profile updated")
            }
            Err(err) => failure_reply(&err, "update"),
        }
    }

    /// 200 on success, 400 for a blank id, 404 when the profile or its
    /// address is missing, 500 on store failure.
    pub fn delete_profile(&self, request: &DeleteProfileRequest) -> UserProfileReply {
        let id = request.user_id.as_str();
        if id.trim().is_empty() {
            return UserProfileReply::new(status::BAD_REQUEST, "Bad request");
        }

        match self.repo.delete_profile(id) {
            Ok(()) => {
                self.cache.invalidate();
                UserProfileReply::new(status::OK, "User profile deleted")
            }
            Err(err) => failure_reply(&err, "delete"),
        }
    }

    /// Looks `id` up in the snapshot, rebuilding it once on a miss.
    pub fn find_profile(&self, id: &str) -> Option<ProfileEntity> {
        if let Some(snapshot) = self.cache.get() {
            if let Some(found) = snapshot.iter().find(|profile| profile.id == id) {
                debug!("event=profile_lookup module=service status=hit id={id}");
                return Some(found.clone());
            }
        }

        debug!("event=profile_lookup module=service status=miss id={id}");
        self.rebuild_snapshot()
            .iter()
            .find(|profile| profile.id == id)
            .cloned()
    }

    /// Every profile, from the snapshot when present.
    pub fn all_profiles(&self) -> Arc<Vec<ProfileEntity>> {
        match self.cache.get() {
            Some(snapshot) => {
                debug!("event=profile_list module=service status=hit");
                snapshot
            }
            None => {
                debug!("event=profile_list module=service status=miss");
                self.rebuild_snapshot()
            }
        }
    }

    /// Discards the snapshot and reloads it from the repository.
    ///
    /// On repository failure the snapshot stays empty and an empty list is
    /// returned.
    pub fn rebuild_snapshot(&self) -> Arc<Vec<ProfileEntity>> {
        self.cache.invalidate();
        match self.repo.get_all_profiles() {
            Ok(profiles) => {
                info!(
                    "event=snapshot_rebuild module=service status=ok count={}",
                    profiles.len()
                );
                self.cache.set(profiles)
            }
            Err(err) => {
                warn!("event=snapshot_rebuild module=service status=error error={err}");
                Arc::new(Vec::new())
            }
        }
    }
}

fn failure_reply(err: &RepoError, op: &str) -> UserProfileReply {
    match err.kind() {
        ErrorKind::BadInput => UserProfileReply::new(status::BAD_REQUEST, err.message()),
        ErrorKind::NotFound => UserProfileReply::new(status::NOT_FOUND, err.message()),
        ErrorKind::StoreFailure => {
            error!("event=profile_{op} module=service status=error error={err}");
            UserProfileReply::new(status::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
