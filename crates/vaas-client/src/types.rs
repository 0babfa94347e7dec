//! Wire types for the VaaS API.
//!
//! The service serializes every enum as its integer discriminant, and wraps
//! every payload in a `{success, data|reason}` envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Declares a fieldless enum that crosses the wire as its `u8` discriminant.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(into = "u8", try_from = "u8")]
        pub enum $name {
            $($variant = $value),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(format!(
                        concat!("invalid ", stringify!($name), " discriminant: {}"),
                        other
                    )),
                }
            }
        }
    };
}

wire_enum! {
    /// The value type a variable stores.
    VariableType {
        Int = 0,
        Double = 1,
        String = 2,
        Bool = 3,
        Json = 4,
    }
}

wire_enum! {
    /// Who may read or write a variable besides its owner.
    VariableVisibility {
        Private = 0,
        PublicReadonly = 1,
        Public = 2,
    }
}

wire_enum! {
    /// The operations a user's API key is authorized for.
    ApiKeyPermissions {
        None = 0,
        Read = 1,
        Write = 2,
        ReadWrite = 3,
        ReadWriteCreate = 4,
        ReadWriteCreateDelete = 5,
    }
}

wire_enum! {
    UserType {
        Standard = 0,
        Premium = 1,
        Admin = 2,
    }
}

wire_enum! {
    /// Products purchasable through the checkout endpoint.
    StripeProduct {
        Premium = 0,
    }
}

/// A typed, owned, permissioned value stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: VariableType,
    pub visibility: VariableVisibility,
    pub is_nullable: bool,
    /// Opaque scalar or JSON document; its schema belongs to the application.
    /// Stripped to null by the server when listed via `get_user_variables`.
    #[serde(default)]
    pub value: Option<Value>,
    /// Id of the owning user.
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub api_key_permissions: ApiKeyPermissions,
    pub is_verified: bool,
    #[serde(rename = "type")]
    pub kind: UserType,
}

/// Point-in-time usage snapshot for one measurement window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quota {
    pub api_key_requests: i64,
    pub logged_in_requests: i64,
    /// When the measurement window started.
    pub created_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub is_nullable: bool,
    pub visibility: VariableVisibility,
    #[serde(rename = "type")]
    pub kind: VariableType,
    /// Left unset, the client fills this with its stored default key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchVariableRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<VariableVisibility>,
    /// Left unset, the client fills this with its stored default key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub api_key_permissions: ApiKeyPermissions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLinkRequest {
    pub product: StripeProduct,
}

/// The `{success, data|reason}` envelope every endpoint answers with.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    reason: Option<String>,
}

/// Decodes a raw response body into the typed success payload, folding both
/// envelope failures and undecodable bodies into `ApiError`.
pub(crate) fn decode_envelope<T>(bytes: &[u8]) -> ApiResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|error| ApiError::Decode(error.to_string()))?;

    if !envelope.success {
        return Err(ApiError::from_reason(envelope.reason));
    }

    serde_json::from_value(envelope.data.unwrap_or(Value::Null))
        .map_err(|error| ApiError::Decode(error.to_string()))
}
