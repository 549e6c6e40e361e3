//! Profile repository: transactional CRUD boundary over a `ProfileStore`.
//!
//! # Responsibility
//! - Reject absent input before touching the store.
//! - Convert store outcomes into `RepoError` kinds.
//!
//! # Invariants
//! - No operation retries; every failure is returned to the caller.
//! - A failed delete removes no rows.

use crate::model::profile::{ProfileEntity, ProfileId};
use crate::repo::profile_store::{DeleteOutcome, ProfileStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Coarse failure category exposed to callers of the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Absent or blank required input; the store was not touched.
    BadInput,
    /// Lookup yielded no row.
    NotFound,
    /// Constraint violation, connectivity loss or other store failure.
    StoreFailure,
}

/// Repository error returned by value from every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    BadInput(&'static str),
    ProfileNotFound(ProfileId),
    AddressNotFound(ProfileId),
    Store(StoreError),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadInput(_) => ErrorKind::BadInput,
            Self::ProfileNotFound(_) | Self::AddressNotFound(_) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::StoreFailure,
        }
    }

    /// Human-readable message suitable for replies.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadInput(details) => write!(f, "Bad input: {details}"),
            Self::ProfileNotFound(_) => f.write_str("Profile not found"),
            Self::AddressNotFound(_) => f.write_str("Address not found"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// CRUD façade over a profile store.
pub struct ProfileRepository<S: ProfileStore> {
    store: S,
}

impl<S: ProfileStore> ProfileRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new profile with its address.
    ///
    /// Fails with `BadInput` when `profile` is absent and with `Store` when
    /// the insert is rejected (for example a duplicate id).
    pub fn create_profile(&self, profile: Option<&ProfileEntity>) -> RepoResult<()> {
        let profile = profile.ok_or(RepoError::BadInput("profile is required"))?;
        self.store.insert(profile).map_err(|err| {
            warn!(
                "event=profile_create module=repo status=error id={} error={}",
                profile.id, err
            );
            RepoError::from(err)
        })?;
        info!("event=profile_create module=repo status=ok id={}", profile.id);
        Ok(())
    }

    /// Loads one profile with its address.
    pub fn get_profile_by_id(&self, id: &str) -> RepoResult<ProfileEntity> {
        if id.trim().is_empty() {
            return Err(RepoError::ProfileNotFound(id.to_string()));
        }

        match self.store.find(id) {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => Err(RepoError::ProfileNotFound(id.to_string())),
            Err(err) => {
                warn!("event=profile_get module=repo status=error id={id} error={err}");
                Err(err.into())
            }
        }
    }

    /// Loads every profile with its address. An empty store yields `Ok(vec![])`.
    pub fn get_all_profiles(&self) -> RepoResult<Vec<ProfileEntity>> {
        self.store.scan().map_err(|err| {
            warn!("event=profile_list module=repo status=error error={err}");
            RepoError::from(err)
        })
    }

    /// Overwrites the stored profile keyed by `profile.id`.
    ///
    /// Existence is not checked here; a store that cannot apply the write
    /// reports a `Store` failure.
    pub fn update_profile(&self, profile: Option<&ProfileEntity>) -> RepoResult<()> {
        let profile = profile.ok_or(RepoError::BadInput("profile is required"))?;
        self.store.update(profile).map_err(|err| {
            warn!(
                "event=profile_update module=repo status=error id={} error={}",
                profile.id, err
            );
            RepoError::from(err)
        })?;
        info!("event=profile_update module=repo status=ok id={}", profile.id);
        Ok(())
    }

    /// Removes a profile and its address. Both rows must exist.
    pub fn delete_profile(&self, id: &str) -> RepoResult<()> {
        if id.trim().is_empty() {
            return Err(RepoError::ProfileNotFound(id.to_string()));
        }

        let outcome = self.store.delete(id).map_err(|err| {
            warn!("event=profile_delete module=repo status=error id={id} error={err}");
            RepoError::from(err)
        })?;

        match outcome {
            DeleteOutcome::Deleted => {
                info!("event=profile_delete module=repo status=ok id={id}");
                Ok(())
            }
            DeleteOutcome::ProfileMissing => Err(RepoError::ProfileNotFound(id.to_string())),
            DeleteOutcome::AddressMissing => {
                warn!(
                    "event=profile_delete module=repo status=error id={id} error_code=address_missing"
                );
                Err(RepoError::AddressNotFound(id.to_string()))
            }
        }
    }
}
