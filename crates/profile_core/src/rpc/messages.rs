//! Wire-facing request/reply messages.
//!
//! Field names serialize in camelCase (`userId`, `statusCode`, ...). Missing
//! string fields deserialize as empty strings, so presence checks see them
//! as blank.

use serde::{Deserialize, Serialize};

/// Reply status codes, HTTP-flavoured.
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// Flat wire representation of a profile and its address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProfileRequest {
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetProfileByIdRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteProfileRequest {
    pub user_id: String,
}

/// Reply for create, update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileReply {
    pub status_code: u16,
    pub message: String,
}

impl UserProfileReply {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProfileByIdReply {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

impl GetProfileByIdReply {
    pub fn found(profile: UserProfile) -> Self {
        Self {
            status_code: status::OK,
            profile: Some(profile),
        }
    }

    pub fn status(status_code: u16) -> Self {
        Self {
            status_code,
            profile: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilesReply {
    pub profiles: Vec<UserProfile>,
}

/// One inbound call, as framed by line-oriented transports.
///
/// ```json
/// {"method":"GetProfileById","params":{"userId":"U1"}}
/// {"method":"GetAllProfiles"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RpcRequest {
    CreateProfile(CreateProfileRequest),
    GetProfileById(GetProfileByIdRequest),
    GetAllProfiles,
    UpdateProfile(UpdateProfileRequest),
    DeleteProfile(DeleteProfileRequest),
}

/// Reply paired with `RpcRequest`, written without an enclosing tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RpcReply {
    Status(UserProfileReply),
    Profile(GetProfileByIdReply),
    Profiles(ProfilesReply),
}
