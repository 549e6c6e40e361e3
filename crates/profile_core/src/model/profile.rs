//! Profile and address entities.
//!
//! # Invariants
//! - `ProfileEntity::id` is stable and never reassigned to another record.
//! - `AddressEntity::user_id` equals the owning profile's `id`.

use serde::{Deserialize, Serialize};

/// Stable identifier for a profile record.
///
/// Caller-supplied; kept as a type alias to make intent explicit in
/// signatures.
pub type ProfileId = String;

/// Persisted profile row together with its joined address row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntity {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// `None` only when the address row is missing in storage, which breaks
    /// the 1:1 invariant and is reported by callers that need it.
    pub address: Option<AddressEntity>,
}

/// Address sub-record. Its primary key is the owning profile id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntity {
    pub user_id: ProfileId,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl ProfileEntity {
    /// Builds a profile with an empty address row keyed by the same id.
    pub fn new(
        id: impl Into<ProfileId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            address: Some(AddressEntity::empty_for(id.clone())),
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Replaces the nested address, re-keying it to this profile's id.
    pub fn with_address(mut self, mut address: AddressEntity) -> Self {
        address.user_id = self.id.clone();
        self.address = Some(address);
        self
    }
}

impl AddressEntity {
    /// Address row with every optional field unset.
    pub fn empty_for(user_id: impl Into<ProfileId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AddressEntity, ProfileEntity};

    #[test]
    fn new_profile_owns_empty_address_with_same_key() {
        let profile = ProfileEntity::new("U1", "John", "Doe", "john@domain.com", "+4673");
        let address = profile.address.expect("address should be present");
        assert_eq!(address.user_id, "U1");
        assert!(address.city.is_none());
    }

    #[test]
    fn with_address_rekeys_to_owner() {
        let address = AddressEntity {
            user_id: "someone-else".to_string(),
            city: Some("London".to_string()),
            ..AddressEntity::default()
        };
        let profile = ProfileEntity::new("U1", "John", "Doe", "j@d.com", "1").with_address(address);
        let address = profile.address.expect("address should be present");
        assert_eq!(address.user_id, "U1");
        assert_eq!(address.city.as_deref(), Some("London"));
    }
}
