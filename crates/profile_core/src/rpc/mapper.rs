//! Stateless conversions between wire profiles and storage entities.
//!
//! # Invariants
//! - Mapping never changes a profile's id; updates merge into the existing
//!   entity and keep its identity.
//! - The nested address is always keyed by the owning profile id.

use crate::model::profile::{AddressEntity, ProfileEntity, ProfileId};
use crate::rpc::messages::UserProfile;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Mapping failure between storage and wire shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The entity has no nested address although every stored profile
    /// must own one.
    MissingAddress(ProfileId),
}

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAddress(id) => write!(f, "profile `{id}` has no address record"),
        }
    }
}

impl Error for MapError {}

/// Builds a storage entity from a wire profile.
///
/// Returns `None` for an absent profile or a blank `user_id`; callers treat
/// that as a bad request.
pub fn to_entity(profile: Option<&UserProfile>) -> Option<ProfileEntity> {
    let profile = profile?;
    if profile.user_id.trim().is_empty() {
        return None;
    }

    Some(ProfileEntity {
        id: profile.user_id.clone(),
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        email: profile.email.clone(),
        phone_number: profile.phone_number.clone(),
        address: Some(address_from(profile, profile.user_id.clone())),
    })
}

/// Merges mutable fields of `profile` into `existing`.
///
/// `existing.id` is kept even when `profile.user_id` differs. Returns
/// `None` when `profile` is absent.
pub fn update_entity(
    profile: Option<&UserProfile>,
    mut existing: ProfileEntity,
) -> Option<ProfileEntity> {
    let profile = profile?;

    existing.first_name = profile.first_name.clone();
    existing.last_name = profile.last_name.clone();
    existing.email = profile.email.clone();
    existing.phone_number = profile.phone_number.clone();

    let owner = existing.id.clone();
    let address = existing
        .address
        .get_or_insert_with(move || AddressEntity::empty_for(owner));
    address.address = profile.address.clone();
    address.postal_code = profile.postal_code.clone();
    address.city = profile.city.clone();

    Some(existing)
}

/// Flattens an entity and its address into the wire shape.
pub fn to_model(entity: &ProfileEntity) -> Result<UserProfile, MapError> {
    let address = entity
        .address
        .as_ref()
        .ok_or_else(|| MapError::MissingAddress(entity.id.clone()))?;

    Ok(UserProfile {
        user_id: entity.id.clone(),
        first_name: entity.first_name.clone(),
        last_name: entity.last_name.clone(),
        email: entity.email.clone(),
        phone_number: entity.phone_number.clone(),
        address: address.address.clone(),
        postal_code: address.postal_code.clone(),
        city: address.city.clone(),
    })
}

fn address_from(profile: &UserProfile, user_id: ProfileId) -> AddressEntity {
    AddressEntity {
        user_id,
        address: profile.address.clone(),
        postal_code: profile.postal_code.clone(),
        city: profile.city.clone(),
    }
}
