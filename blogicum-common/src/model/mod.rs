pub mod auth;
pub mod category;
pub mod location;
pub mod post;
pub mod title;
pub mod user;

use crate::{
    model::{
        auth::InvalidAuthTokenPartError, category::InvalidSlugError, title::InvalidTitleError,
        user::InvalidUsernameError,
    },
    util::{FractionalSecondsError, NonPositiveDurationError},
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData};
use thiserror::Error;
use time::{OffsetDateTime, error::ComponentRange};

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum ModelValidationError {
    #[error(transparent)]
    Title(#[from] InvalidTitleError),
    #[error(transparent)]
    Slug(#[from] InvalidSlugError),
    #[error(transparent)]
    Username(#[from] InvalidUsernameError),
    #[error(transparent)]
    NonPositiveDuration(#[from] NonPositiveDurationError),
    #[error(transparent)]
    AuthTokenPart(#[from] InvalidAuthTokenPartError),
    #[error(transparent)]
    FractionalSeconds(#[from] FractionalSecondsError),
    #[error("Timestamp out of range: {0}")]
    Timestamp(#[from] ComponentRange),
}

/// Row id of the entity identified by `Marker`.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id<Marker>(i64, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<i64> for Id<Marker> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for i64 {
    fn from(value: Id<Marker>) -> Self {
        value.get()
    }
}

/// Fields shared by every publishable entity.
///
/// `created_at` is assigned once on insert and never written again;
/// `is_published` only changes through explicit admin edits.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Publication {
    pub is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
