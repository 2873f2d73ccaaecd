use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use blogicum_common::{
    admin::AdminSite,
    model::{
        Id,
        auth::{AuthTokenDecodeError, AuthTokenHashError},
        category::CategoryMarker,
        location::LocationMarker,
        post::PostMarker,
        user::UserMarker,
    },
    util::NonPositiveDurationError,
};
use blogicum_db::client::{DbClient, DbError};
use extract::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod auth;
mod extract;
mod page;
mod routes;
mod templates;

pub use page::PageError;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
    pub admin_site: Arc<AdminSite>,
}

impl ServerState {
    #[must_use]
    pub fn new(db_client: DbClient) -> Self {
        Self {
            db_client: Arc::new(db_client),
            admin_site: Arc::new(AdminSite::blog()),
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

/// The complete application, ready to be served.
pub fn app(state: ServerState) -> Router {
    routes().with_state(state)
}

pub async fn fallback(request: Request) -> PageError {
    PageError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Failures of the admin JSON API.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query string rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("The provided auth token could not be decoded: {0}")]
    InvalidAuthToken(#[from] AuthTokenDecodeError),
    #[error("The auth token could not be hashed: {0}")]
    AuthTokenHash(#[from] AuthTokenHashError),
    #[error("Provided token was invalid")]
    InvalidToken,
    #[error("Provided token has expired")]
    ExpiredToken,
    #[error("User with id {0} is not staff")]
    NotStaff(Id<UserMarker>),
    #[error("Token lifetime must be positive: {0}")]
    InvalidTokenLifetime(#[from] NonPositiveDurationError),
    #[error("Token lifetime of {0} seconds reaches past the supported date range")]
    TokenLifetimeOutOfRange(i64),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("No admin is registered for {0}")]
    UnregisteredModel(&'static str),
    #[error("A {0} list row did not serialize to a JSON object")]
    ListRowNotObject(&'static str),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Category with id {0} was not found.")]
    CategoryByIdNotFound(Id<CategoryMarker>),
    #[error("Location with id {0} was not found.")]
    LocationByIdNotFound(Id<LocationMarker>),
    #[error("User with id {0} was not found.")]
    UserByIdNotFound(Id<UserMarker>),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::PathRejection(_)
            | ServerError::UnregisteredModel(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::CategoryByIdNotFound(_)
            | ServerError::LocationByIdNotFound(_)
            | ServerError::UserByIdNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidAuthToken(_)
            | ServerError::InvalidToken
            | ServerError::ExpiredToken => StatusCode::UNAUTHORIZED,
            ServerError::NotStaff(_) => StatusCode::FORBIDDEN,
            ServerError::QueryRejection(_) | ServerError::JsonRejection(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::Database(DbError::UniqueViolation(_)) => StatusCode::CONFLICT,
            ServerError::Database(DbError::ForeignKeyViolation(_))
            | ServerError::InvalidTokenLifetime(_)
            | ServerError::TokenLifetimeOutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::JsonResponse(_)
            | ServerError::ListRowNotObject(_)
            | ServerError::Database(_)
            | ServerError::AuthTokenHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}
