//! The opaque token returned by the JSON log-in API.
//!
//! The token is the standard base64 encoding of a JSON object with the user's
//! ID, email and role. It is not signed and is only meant to identify the user
//! to API clients.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{Role, Session, UserID},
};

/// The claims carried by an API token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The ID of the logged-in user.
    pub id: UserID,
    /// The email the user logged in with.
    pub email: String,
    /// Whether the user is an employee or an owner.
    pub role: Role,
}

impl From<&Session> for TokenClaims {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user_id,
            email: session.email.clone(),
            role: session.role,
        }
    }
}

/// Encode `claims` as a token.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the claims could not be serialized.
pub fn encode_token(claims: &TokenClaims) -> Result<String, Error> {
    let json = serde_json::to_vec(claims)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(STANDARD.encode(json))
}

/// Decode a token created by [encode_token].
///
/// # Errors
///
/// Returns [Error::InvalidToken] if `token` is not base64 encoded JSON claims.
pub fn decode_token(token: &str) -> Result<TokenClaims, Error> {
    let json = STANDARD
        .decode(token)
        .map_err(|error| Error::InvalidToken(error.to_string()))?;

    serde_json::from_slice(&json).map_err(|error| Error::InvalidToken(error.to_string()))
}

#[cfg(test)]
mod tests {
    use base64::{Engine, engine::general_purpose::STANDARD};

    use crate::{
        Error,
        auth::{Role, UserID},
    };

    use super::{TokenClaims, decode_token, encode_token};

    #[test]
    fn token_decodes_to_claims() {
        let claims = TokenClaims {
            id: UserID::generate(),
            email: "owner@example.com".to_owned(),
            role: Role::Owner,
        };

        let token = encode_token(&claims).unwrap();

        assert_eq!(decode_token(&token).unwrap(), claims);
    }

    #[test]
    fn token_is_base64_json() {
        let claims = TokenClaims {
            id: UserID::generate(),
            email: "a@example.com".to_owned(),
            role: Role::Employee,
        };

        let token = encode_token(&claims).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(token).unwrap()).unwrap();

        assert_eq!(json["email"], "a@example.com");
        assert_eq!(json["role"], "employee");
        assert_eq!(json["id"], claims.id.to_string());
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            decode_token("not base64!"),
            Err(Error::InvalidToken(_))
        ));
    }
}
