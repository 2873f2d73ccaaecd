use crate::{
    model::{
        Id, Publication,
        category::{Category, CategoryMarker},
        location::{Location, LocationMarker},
        title::Title,
        user::{User, UserMarker},
    },
    util::{double_option, preview, published_by_default, rfc3339_seconds},
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use time::OffsetDateTime;

pub const TEXT_PREVIEW_LEN: usize = 150;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

/// A post together with its author, location and category.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
pub struct Post {
    pub id: Id<PostMarker>,
    pub title: Title,
    pub text: String,
    /// May lie in the future to schedule a publication.
    #[serde(with = "time::serde::rfc3339")]
    pub pub_date: OffsetDateTime,
    pub author: User,
    pub location: Option<Location>,
    pub category: Option<Category>,
    #[serde(flatten)]
    pub publication: Publication,
}

/// Writable columns of a post.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct PostFields {
    pub title: Title,
    pub text: String,
    /// Stored with second precision; fractional seconds are rejected.
    #[serde(with = "rfc3339_seconds")]
    pub pub_date: OffsetDateTime,
    pub author: Id<UserMarker>,
    #[serde(default)]
    pub location: Option<Id<LocationMarker>>,
    #[serde(default)]
    pub category: Option<Id<CategoryMarker>>,
    #[serde(default = "published_by_default")]
    pub is_published: bool,
}

/// Partial update of a post. `location` and `category` are cleared by an explicit `null`.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct PostPatch {
    pub title: Option<Title>,
    pub text: Option<String>,
    #[serde(default, with = "rfc3339_seconds::option")]
    pub pub_date: Option<OffsetDateTime>,
    pub author: Option<Id<UserMarker>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<Id<LocationMarker>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<Id<CategoryMarker>>>,
    pub is_published: Option<bool>,
}

impl Post {
    /// Whether the post may be shown publicly at `now`.
    ///
    /// Mirrors the condition the database applies to every public query.
    #[must_use]
    pub fn is_visible_at(&self, now: OffsetDateTime) -> bool {
        self.publication.is_published
            && self.pub_date <= now
            && self
                .category
                .as_ref()
                .is_none_or(|category| category.publication.is_published)
    }

    #[must_use]
    pub fn text_short(&self) -> Cow<'_, str> {
        preview(&self.text, TEXT_PREVIEW_LEN)
    }
}

impl PostPatch {
    pub fn apply(self, fields: &mut PostFields) {
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(text) = self.text {
            fields.text = text;
        }
        if let Some(pub_date) = self.pub_date {
            fields.pub_date = pub_date;
        }
        if let Some(author) = self.author {
            fields.author = author;
        }
        if let Some(location) = self.location {
            fields.location = location;
        }
        if let Some(category) = self.category {
            fields.category = category;
        }
        if let Some(is_published) = self.is_published {
            fields.is_published = is_published;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id, Publication,
        category::{Category, Slug},
        post::{Post, PostFields, PostPatch},
        title::Title,
        user::{User, Username},
    };
    use time::{Duration, OffsetDateTime, macros::datetime};

    const NOW: OffsetDateTime = datetime!(2025-06-15 12:00 UTC);

    fn category(is_published: bool) -> Category {
        Category {
            id: Id::new(1),
            title: Title::new("News".to_owned()).unwrap(),
            description: "Latest news".to_owned(),
            slug: Slug::new("news".to_owned()).unwrap(),
            publication: Publication {
                is_published,
                created_at: NOW - Duration::days(30),
            },
        }
    }

    fn post(is_published: bool, pub_date: OffsetDateTime, category: Option<Category>) -> Post {
        Post {
            id: Id::new(7),
            title: Title::new("Hello".to_owned()).unwrap(),
            text: "Body".to_owned(),
            pub_date,
            author: User {
                id: Id::new(1),
                username: Username::new("author".to_owned()).unwrap(),
                is_staff: false,
                created_at: NOW - Duration::days(60),
            },
            location: None,
            category,
            publication: Publication {
                is_published,
                created_at: NOW - Duration::days(2),
            },
        }
    }

    #[test]
    fn published_past_post_in_published_category_is_visible() {
        let yesterday = NOW - Duration::days(1);
        assert!(post(true, yesterday, Some(category(true))).is_visible_at(NOW));
    }

    #[test]
    fn post_without_category_is_visible() {
        assert!(post(true, NOW, None).is_visible_at(NOW));
    }

    #[test]
    fn unpublished_post_is_hidden() {
        assert!(!post(false, NOW - Duration::days(1), None).is_visible_at(NOW));
    }

    #[test]
    fn future_post_is_hidden_until_pub_date() {
        let tomorrow = NOW + Duration::days(1);
        let scheduled = post(true, tomorrow, Some(category(true)));

        assert!(!scheduled.is_visible_at(NOW));
        assert!(scheduled.is_visible_at(tomorrow));
    }

    #[test]
    fn unpublished_category_hides_post() {
        assert!(!post(true, NOW - Duration::days(1), Some(category(false))).is_visible_at(NOW));
    }

    #[test]
    fn text_preview() {
        let mut long = post(true, NOW, None);
        long.text = "a".repeat(151);

        assert_eq!(long.text_short(), format!("{}...", "a".repeat(150)));
        assert_eq!(post(true, NOW, None).text_short(), "Body");
    }

    #[test]
    fn patch_clears_references_on_null() {
        let mut fields: PostFields = serde_json::from_str(
            r#"{
                "title": "Hello",
                "text": "Body",
                "pub_date": "2025-06-15T12:00:00Z",
                "author": 1,
                "location": 2,
                "category": 3
            }"#,
        )
        .unwrap();
        assert!(fields.is_published);

        let patch: PostPatch =
            serde_json::from_str(r#"{"location": null, "title": "Renamed"}"#).unwrap();
        patch.apply(&mut fields);

        assert_eq!(fields.location, None);
        assert_eq!(fields.category, Some(Id::new(3)));
        assert_eq!(fields.title.get(), "Renamed");
        assert_eq!(fields.pub_date, NOW);
    }

    #[test]
    fn pub_date_must_be_whole_seconds() {
        let fractional = r#"{
            "title": "Hello",
            "text": "Body",
            "pub_date": "2025-06-15T12:00:00.900Z",
            "author": 1
        }"#;
        assert!(serde_json::from_str::<PostFields>(fractional).is_err());

        assert!(
            serde_json::from_str::<PostPatch>(r#"{"pub_date": "2025-06-15T12:00:00.1Z"}"#).is_err()
        );
        let patch: PostPatch =
            serde_json::from_str(r#"{"pub_date": "2025-06-15T12:00:00Z"}"#).unwrap();
        assert_eq!(patch.pub_date, Some(NOW));
    }
}
