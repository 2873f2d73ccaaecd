use blogicum_common::{
    model::{
        ModelValidationError, Publication,
        auth::Authentication,
        category::{Category, CategoryFields, Slug},
        location::{Location, LocationFields},
        post::{Post, PostFields},
        title::Title,
        user::{User, Username},
    },
    util::PositiveDuration,
};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime, error::ComponentRange};

pub(crate) fn timestamp(unix_seconds: i64) -> Result<OffsetDateTime, ComponentRange> {
    OffsetDateTime::from_unix_timestamp(unix_seconds)
}

fn publication(is_published: bool, created_at: i64) -> Result<Publication, ComponentRange> {
    Ok(Publication {
        is_published,
        created_at: timestamp(created_at)?,
    })
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
    pub created_at: i64,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct LocationRecord {
    pub location_id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: i64,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct CategoryRecord {
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: i64,
}

/// A post row joined with its author and, when set, its location and category.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct FullPostRecord {
    pub post_id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: i64,
    pub is_published: bool,
    pub created_at: i64,
    pub author_id: i64,
    pub author_username: String,
    pub author_is_staff: bool,
    pub author_created_at: i64,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub location_is_published: Option<bool>,
    pub location_created_at: Option<i64>,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub category_description: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub category_created_at: Option<i64>,
}

/// The writable columns of a post, without joins.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct PostFieldsRecord {
    pub title: String,
    pub text: String,
    pub pub_date: i64,
    pub author_id: i64,
    pub location_id: Option<i64>,
    pub category_id: Option<i64>,
    pub is_published: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct AuthenticationRecord {
    pub token_id: i64,
    pub user_id: i64,
    pub salt: Vec<u8>,
    pub token_hash: Vec<u8>,
    pub created_at: i64,
    pub expires_after_seconds: Option<i64>,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.user_id.into(),
            username: Username::new(value.username)?,
            is_staff: value.is_staff,
            created_at: timestamp(value.created_at)?,
        })
    }
}

impl TryFrom<LocationRecord> for Location {
    type Error = ModelValidationError;

    fn try_from(value: LocationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.location_id.into(),
            name: Title::new(value.name)?,
            publication: publication(value.is_published, value.created_at)?,
        })
    }
}

impl TryFrom<LocationRecord> for LocationFields {
    type Error = ModelValidationError;

    fn try_from(value: LocationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            name: Title::new(value.name)?,
            is_published: value.is_published,
        })
    }
}

impl TryFrom<CategoryRecord> for Category {
    type Error = ModelValidationError;

    fn try_from(value: CategoryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.category_id.into(),
            title: Title::new(value.title)?,
            description: value.description,
            slug: Slug::new(value.slug)?,
            publication: publication(value.is_published, value.created_at)?,
        })
    }
}

impl TryFrom<CategoryRecord> for CategoryFields {
    type Error = ModelValidationError;

    fn try_from(value: CategoryRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            title: Title::new(value.title)?,
            description: value.description,
            slug: Slug::new(value.slug)?,
            is_published: value.is_published,
        })
    }
}

impl TryFrom<FullPostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: FullPostRecord) -> Result<Self, Self::Error> {
        let location = match (
            value.location_id,
            value.location_name,
            value.location_is_published,
            value.location_created_at,
        ) {
            (Some(location_id), Some(name), Some(is_published), Some(created_at)) => {
                Some(Location::try_from(LocationRecord {
                    location_id,
                    name,
                    is_published,
                    created_at,
                })?)
            }
            _ => None,
        };

        let category = match (
            value.category_id,
            value.category_title,
            value.category_description,
            value.category_slug,
            value.category_is_published,
            value.category_created_at,
        ) {
            (
                Some(category_id),
                Some(title),
                Some(description),
                Some(slug),
                Some(is_published),
                Some(created_at),
            ) => Some(Category::try_from(CategoryRecord {
                category_id,
                title,
                description,
                slug,
                is_published,
                created_at,
            })?),
            _ => None,
        };

        Ok(Self {
            id: value.post_id.into(),
            title: Title::new(value.title)?,
            text: value.text,
            pub_date: timestamp(value.pub_date)?,
            author: User::try_from(UserRecord {
                user_id: value.author_id,
                username: value.author_username,
                is_staff: value.author_is_staff,
                created_at: value.author_created_at,
            })?,
            location,
            category,
            publication: publication(value.is_published, value.created_at)?,
        })
    }
}

impl TryFrom<PostFieldsRecord> for PostFields {
    type Error = ModelValidationError;

    fn try_from(value: PostFieldsRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            title: Title::new(value.title)?,
            text: value.text,
            pub_date: timestamp(value.pub_date)?,
            author: value.author_id.into(),
            location: value.location_id.map(Into::into),
            category: value.category_id.map(Into::into),
            is_published: value.is_published,
        })
    }
}

impl TryFrom<AuthenticationRecord> for Authentication {
    type Error = ModelValidationError;

    fn try_from(value: AuthenticationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            token_id: value.token_id.into(),
            user: value.user_id.into(),
            salt: value.salt.try_into()?,
            token_hash: value.token_hash.try_into()?,
            created_at: timestamp(value.created_at)?,
            expires_after: value
                .expires_after_seconds
                .map(|seconds| Duration::seconds(seconds).try_into())
                .transpose()?,
        })
    }
}
