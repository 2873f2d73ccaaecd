use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Characters kept when an entity is shown by name in a listing.
pub const DISPLAY_NAME_LEN: usize = 30;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Default, Hash)]
pub struct PositiveDuration(Duration);

impl PositiveDuration {
    #[must_use]
    pub fn new(duration: Duration) -> Option<Self> {
        duration.is_positive().then_some(Self(duration))
    }

    #[must_use]
    pub fn get(&self) -> Duration {
        self.0
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The duration is not positive: {0}")]
pub struct NonPositiveDurationError(Duration);

impl TryFrom<Duration> for PositiveDuration {
    type Error = NonPositiveDurationError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NonPositiveDurationError(value))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Error)]
#[error("Timestamp has a fractional second: {0}")]
pub struct FractionalSecondsError(OffsetDateTime);

/// Accepts `timestamp` only if it has no sub-second part.
pub fn whole_seconds(
    timestamp: OffsetDateTime,
) -> Result<OffsetDateTime, FractionalSecondsError> {
    if timestamp.nanosecond() == 0 {
        Ok(timestamp)
    } else {
        Err(FractionalSecondsError(timestamp))
    }
}

/// RFC 3339 timestamps restricted to whole seconds, the precision dates are stored with.
pub mod rfc3339_seconds {
    use crate::util::whole_seconds;
    use serde::{Deserializer, de::Error};
    use time::OffsetDateTime;

    pub use time::serde::rfc3339::serialize;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let timestamp = time::serde::rfc3339::deserialize(deserializer)?;
        whole_seconds(timestamp).map_err(D::Error::custom)
    }

    pub mod option {
        use crate::util::whole_seconds;
        use serde::{Deserializer, de::Error};
        use time::OffsetDateTime;

        pub use time::serde::rfc3339::option::serialize;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<OffsetDateTime>, D::Error> {
            time::serde::rfc3339::option::deserialize(deserializer)?
                .map(whole_seconds)
                .transpose()
                .map_err(D::Error::custom)
        }
    }
}

/// The first `max_chars` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Like [`truncate_chars`], but marks a cut with a trailing `...`.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> Cow<'_, str> {
    let truncated = truncate_chars(text, max_chars);
    if truncated.len() == text.len() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{truncated}..."))
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Must be combined with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn published_by_default() -> bool {
    true
}
