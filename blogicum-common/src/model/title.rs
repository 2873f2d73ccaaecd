use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const TITLE_MAX_LEN: usize = 256;

/// Non-blank single-line title of at most [`TITLE_MAX_LEN`] characters.
///
/// Used for post and category titles as well as location names.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Title(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The title is invalid: {0:?}")]
pub struct InvalidTitleError(String);

impl Title {
    pub fn new(title: String) -> Result<Self, InvalidTitleError> {
        if !title.trim().is_empty()
            && !title.contains(is_line_break)
            && title.chars().count() <= TITLE_MAX_LEN
        {
            Ok(Self(title))
        } else {
            Err(InvalidTitleError(title))
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

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

impl Display for Title {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Title {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Title::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Title"))
    }
}
