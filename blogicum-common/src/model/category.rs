use crate::{
    model::{Id, Publication, title::Title},
    util::{DISPLAY_NAME_LEN, preview, published_by_default, truncate_chars},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
};
use thiserror::Error;

pub const SLUG_MAX_LEN: usize = 50;
pub const DESCRIPTION_PREVIEW_LEN: usize = 50;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CategoryMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Category {
    pub id: Id<CategoryMarker>,
    pub title: Title,
    pub description: String,
    pub slug: Slug,
    #[serde(flatten)]
    pub publication: Publication,
}

/// Writable columns of a category.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct CategoryFields {
    pub title: Title,
    pub description: String,
    pub slug: Slug,
    #[serde(default = "published_by_default")]
    pub is_published: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct CategoryPatch {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub slug: Option<Slug>,
    pub is_published: Option<bool>,
}

/// URL identifier of a category: ASCII letters, digits, `-` and `_`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The slug is invalid: {0:?}")]
pub struct InvalidSlugError(String);

impl Category {
    #[must_use]
    pub fn display_name(&self) -> &str {
        truncate_chars(self.title.get(), DISPLAY_NAME_LEN)
    }

    #[must_use]
    pub fn description_short(&self) -> Cow<'_, str> {
        preview(&self.description, DESCRIPTION_PREVIEW_LEN)
    }
}

impl CategoryPatch {
    pub fn apply(self, fields: &mut CategoryFields) {
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(slug) = self.slug {
            fields.slug = slug;
        }
        if let Some(is_published) = self.is_published {
            fields.is_published = is_published;
        }
    }
}

impl Slug {
    pub fn new(slug: String) -> Result<Self, InvalidSlugError> {
        let allowed = slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));

        if allowed && (1..=SLUG_MAX_LEN).contains(&slug.len()) {
            Ok(Self(slug))
        } else {
            Err(InvalidSlugError(slug))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Slug {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Slug::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Slug"))
    }
}
