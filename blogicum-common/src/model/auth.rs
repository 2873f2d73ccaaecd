use crate::{
    model::{Id, user::UserMarker},
    util::PositiveDuration,
};
use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_URL_SAFE_NO_PAD};
use std::{
    fmt::{Debug, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;
use time::OffsetDateTime;

pub const AUTH_TOKEN_SECRET_LEN: usize = 24;
pub const AUTH_TOKEN_SALT_LEN: usize = 16;
pub const AUTH_TOKEN_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AuthTokenMarker;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing auth token failed: {0}")]
pub struct AuthTokenHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum AuthTokenDecodeError {
    #[error("Token id and secret must be separated by ':'")]
    MissingSeparator,
    #[error("Invalid token id: {0}")]
    InvalidTokenId(ParseIntError),
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the secret is incorrect")]
    InvalidSecretLength,
}

/// Bearer token handed out to an admin.
///
/// Only the id is stored in clear; the database keeps a salted hash of the secret.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthToken {
    pub id: Id<AuthTokenMarker>,
    pub secret: [u8; AUTH_TOKEN_SECRET_LEN],
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthTokenSalt(pub [u8; AUTH_TOKEN_SALT_LEN]);

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct AuthTokenHash(pub Box<[u8; AUTH_TOKEN_HASH_LEN]>);

/// Stored side of an [`AuthToken`].
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Authentication {
    pub token_id: Id<AuthTokenMarker>,
    pub user: Id<UserMarker>,
    pub salt: AuthTokenSalt,
    pub token_hash: AuthTokenHash,
    pub created_at: OffsetDateTime,
    pub expires_after: Option<PositiveDuration>,
}

impl AuthToken {
    #[must_use]
    pub fn generate_secret() -> [u8; AUTH_TOKEN_SECRET_LEN] {
        rand::random()
    }

    #[must_use]
    pub fn as_token_str(&self) -> String {
        let encoded_secret = Base64Display::new(&self.secret, &BASE64_URL_SAFE_NO_PAD);
        format!("{}:{encoded_secret}", self.id)
    }

    pub fn hash(&self, salt: &AuthTokenSalt) -> Result<AuthTokenHash, AuthTokenHashError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; AUTH_TOKEN_HASH_LEN]);
        argon2
            .hash_password_into(&self.secret, &salt.0, &mut *hash)
            .map_err(AuthTokenHashError)?;

        Ok(AuthTokenHash(hash))
    }
}

impl AuthTokenSalt {
    #[must_use]
    pub fn generate_random() -> Self {
        Self(rand::random())
    }
}

impl Authentication {
    /// A lifetime reaching past the representable range never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_after
            .and_then(|expires_after| self.created_at.checked_add(expires_after.get()))
            .is_some_and(|expires_at| expires_at < now)
    }

    pub fn verify(&self, token: &AuthToken) -> Result<bool, AuthTokenHashError> {
        if token.id != self.token_id {
            return Ok(false);
        }
        Ok(token.hash(&self.salt)? == self.token_hash)
    }
}

impl FromStr for AuthToken {
    type Err = AuthTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id_part, secret_part) = s.split_once(':').ok_or(Self::Err::MissingSeparator)?;

        let id = i64::from_str(id_part)
            .map_err(Self::Err::InvalidTokenId)?
            .into();
        let secret = BASE64_URL_SAFE_NO_PAD
            .decode(secret_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSecretLength)?;

        Ok(Self { id, secret })
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("id", &self.id)
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl Debug for AuthTokenSalt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthTokenSalt").field(&"[redacted]").finish()
    }
}

impl Debug for AuthTokenHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthTokenHash").field(&"[redacted]").finish()
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("A stored auth token part had an invalid length")]
pub struct InvalidAuthTokenPartError;

impl TryFrom<Vec<u8>> for AuthTokenHash {
    type Error = InvalidAuthTokenPartError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let bytes: [u8; AUTH_TOKEN_HASH_LEN] =
            value.try_into().map_err(|_| InvalidAuthTokenPartError)?;
        Ok(Self(Box::new(bytes)))
    }
}

impl TryFrom<Vec<u8>> for AuthTokenSalt {
    type Error = InvalidAuthTokenPartError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Ok(Self(value.try_into().map_err(|_| InvalidAuthTokenPartError)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            Id,
            auth::{AuthToken, AuthTokenDecodeError, AuthTokenSalt, Authentication},
        },
        util::PositiveDuration,
    };
    use time::{Duration, macros::datetime};

    fn token() -> AuthToken {
        AuthToken {
            id: Id::new(12),
            secret: [7; 24],
        }
    }

    #[test]
    fn token_string_round_trip() {
        let token = token();
        let parsed: AuthToken = token.as_token_str().parse().unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(
            "no-separator".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::MissingSeparator)
        );
        assert!(matches!(
            "abc:AAAA".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::InvalidTokenId(_))
        ));
        assert_eq!(
            "1:AAAA".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::InvalidSecretLength)
        );
        assert!(matches!(
            "1:!!!".parse::<AuthToken>(),
            Err(AuthTokenDecodeError::Decode(_))
        ));
    }

    #[test]
    fn verification_and_expiry() {
        let token = token();
        let salt = AuthTokenSalt([3; 16]);
        let created_at = datetime!(2025-01-01 00:00 UTC);

        let authentication = Authentication {
            token_id: token.id,
            user: Id::new(1),
            token_hash: token.hash(&salt).unwrap(),
            salt,
            created_at,
            expires_after: PositiveDuration::new(Duration::hours(1)),
        };

        assert!(authentication.verify(&token).unwrap());

        let forged = AuthToken {
            secret: [8; 24],
            ..token.clone()
        };
        assert!(!authentication.verify(&forged).unwrap());

        assert!(!authentication.is_expired_at(created_at + Duration::minutes(59)));
        assert!(authentication.is_expired_at(created_at + Duration::minutes(61)));
    }

    #[test]
    fn huge_lifetime_never_expires() {
        let token = token();
        let salt = AuthTokenSalt([3; 16]);

        let authentication = Authentication {
            token_id: token.id,
            user: Id::new(1),
            token_hash: token.hash(&salt).unwrap(),
            salt,
            created_at: datetime!(2025-01-01 00:00 UTC),
            expires_after: PositiveDuration::new(Duration::seconds(i64::MAX)),
        };

        assert!(!authentication.is_expired_at(datetime!(2025-01-02 00:00 UTC)));
        assert!(!authentication.is_expired_at(datetime!(9999-12-31 23:59 UTC)));
    }
}
