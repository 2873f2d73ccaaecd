use crate::{
    model::{Id, Publication, title::Title},
    util::{DISPLAY_NAME_LEN, published_by_default, truncate_chars},
};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct LocationMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Location {
    pub id: Id<LocationMarker>,
    pub name: Title,
    #[serde(flatten)]
    pub publication: Publication,
}

/// Writable columns of a location.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct LocationFields {
    pub name: Title,
    #[serde(default = "published_by_default")]
    pub is_published: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct LocationPatch {
    pub name: Option<Title>,
    pub is_published: Option<bool>,
}

impl Location {
    #[must_use]
    pub fn display_name(&self) -> &str {
        truncate_chars(self.name.get(), DISPLAY_NAME_LEN)
    }
}

impl LocationPatch {
    pub fn apply(self, fields: &mut LocationFields) {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(is_published) = self.is_published {
            fields.is_published = is_published;
        }
    }
}
