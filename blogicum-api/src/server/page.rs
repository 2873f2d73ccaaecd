use crate::server::templates;
use axum::{
    extract::rejection::PathRejection,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use blogicum_common::model::{Id, post::PostMarker};
use blogicum_db::client::DbError;
use thiserror::Error;
use tracing::error;

/// Failures of the public pages. Every one of them renders an HTML page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
    #[error("Category with slug {0:?} was not found.")]
    CategoryBySlugNotFound(String),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::UnknownRoute(_)
            | PageError::PathRejection(_)
            | PageError::PostByIdNotFound(_)
            | PageError::CategoryBySlugNotFound(_) => StatusCode::NOT_FOUND,
            PageError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Rendering error page");

        let page = if status == StatusCode::NOT_FOUND {
            templates::not_found()
        } else {
            templates::server_error()
        };
        (status, page).into_response()
    }
}
