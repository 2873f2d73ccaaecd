use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use blogicum_common::model::{auth::AuthToken, user::User};
use blogicum_db::client::DbClient;
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// A staff user authenticated by a bearer token.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct StaffUser(pub User);

impl<S> FromRequestParts<S> for StaffUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let request_token: AuthToken = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?
            .token()
            .parse()?;

        let db = Arc::<DbClient>::from_ref(state);
        let authentication = db
            .fetch_auth(request_token.id)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        if !authentication.verify(&request_token)? {
            return Err(ServerError::InvalidToken);
        }
        if authentication.is_expired_at(OffsetDateTime::now_utc()) {
            return Err(ServerError::ExpiredToken);
        }

        let user = db
            .fetch_user(authentication.user)
            .await?
            .ok_or(ServerError::InvalidToken)?;
        if !user.is_staff {
            return Err(ServerError::NotStaff(user.id));
        }

        debug!(user_id = user.id.get(), "Authenticated staff user");
        Ok(Self(user))
    }
}
