use crate::server::{Result, ServerError, ServerRouter, auth::StaffUser, extract::Json};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use blogicum_common::{
    model::{
        Id,
        auth::AuthTokenMarker,
        user::{CreateUser, User, UserMarker},
    },
    util::PositiveDuration,
};
use blogicum_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_user)
        .typed_delete(delete_user)
        .typed_post(issue_token)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/users", rejection(ServerError))]
struct UsersPath();

async fn create_user(
    UsersPath(): UsersPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
    Json(user): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = db.create_user(&user, OffsetDateTime::now_utc()).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/users/{id}", rejection(ServerError))]
struct UserPath {
    id: Id<UserMarker>,
}

/// Also deletes every post the user wrote.
async fn delete_user(
    UserPath { id }: UserPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
) -> Result<StatusCode> {
    if db.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::UserByIdNotFound(id))
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/users/{id}/tokens", rejection(ServerError))]
struct UserTokensPath {
    id: Id<UserMarker>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct IssueToken {
    /// Lifetime of the token; it never expires when absent.
    expires_after_seconds: Option<i64>,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct IssuedToken {
    token_id: Id<AuthTokenMarker>,
    user_id: Id<UserMarker>,
    /// The only time the secret is revealed.
    token: String,
    expires_after_seconds: Option<i64>,
}

async fn issue_token(
    UserTokensPath { id }: UserTokensPath,
    State(db): State<Arc<DbClient>>,
    StaffUser(issuer): StaffUser,
    Json(request): Json<IssueToken>,
) -> Result<(StatusCode, Json<IssuedToken>)> {
    let now = OffsetDateTime::now_utc();
    let expires_after = request
        .expires_after_seconds
        .map(|seconds| -> Result<PositiveDuration> {
            let lifetime = PositiveDuration::try_from(Duration::seconds(seconds))?;
            match now.checked_add(lifetime.get()) {
                Some(_) => Ok(lifetime),
                None => Err(ServerError::TokenLifetimeOutOfRange(seconds)),
            }
        })
        .transpose()?;

    let user = db
        .fetch_user(id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;
    let token = db
        .create_auth_token(user.id, expires_after, now)
        .await?;

    info!(
        token_id = token.id.get(),
        user_id = user.id.get(),
        issuer_id = issuer.id.get(),
        "Token issued through admin"
    );
    Ok((
        StatusCode::CREATED,
        Json(IssuedToken {
            token_id: token.id,
            user_id: user.id,
            token: token.as_token_str(),
            expires_after_seconds: request.expires_after_seconds,
        }),
    ))
}
