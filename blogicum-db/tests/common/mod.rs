#![allow(dead_code)]

use blogicum_common::model::{
    Id,
    category::{Category, CategoryFields, CategoryMarker, Slug},
    location::{Location, LocationFields, LocationMarker},
    post::{Post, PostFields},
    title::Title,
    user::{CreateUser, User, Username},
};
use blogicum_db::client::DbClient;
use time::{Duration, OffsetDateTime, macros::datetime};

pub const NOW: OffsetDateTime = datetime!(2025-06-15 12:00 UTC);

pub fn yesterday() -> OffsetDateTime {
    NOW - Duration::days(1)
}

pub fn tomorrow() -> OffsetDateTime {
    NOW + Duration::days(1)
}

pub fn title(title: &str) -> Title {
    Title::new(title.to_owned()).unwrap()
}

/// A migrated in-memory database with one author.
pub struct Blog {
    pub db: DbClient,
    pub author: User,
}

impl Blog {
    pub async fn new() -> Self {
        let db = DbClient::connect_in_memory().await.unwrap();
        let author = db
            .create_user(
                &CreateUser {
                    username: Username::new("author".to_owned()).unwrap(),
                    is_staff: false,
                },
                NOW - Duration::days(100),
            )
            .await
            .unwrap();

        Self { db, author }
    }

    pub async fn category(&self, slug: &str, is_published: bool) -> Category {
        self.db
            .create_category(
                &CategoryFields {
                    title: title(&format!("Category {slug}")),
                    description: format!("All about {slug}"),
                    slug: Slug::new(slug.to_owned()).unwrap(),
                    is_published,
                },
                NOW - Duration::days(50),
            )
            .await
            .unwrap()
    }

    pub async fn location(&self, name: &str) -> Location {
        self.db
            .create_location(
                &LocationFields {
                    name: title(name),
                    is_published: true,
                },
                NOW - Duration::days(50),
            )
            .await
            .unwrap()
    }

    pub fn fields(&self, name: &str, pub_date: OffsetDateTime) -> PostFields {
        PostFields {
            title: title(name),
            text: format!("Text of {name}"),
            pub_date,
            author: self.author.id,
            location: None,
            category: None,
            is_published: true,
        }
    }

    pub async fn post(
        &self,
        name: &str,
        pub_date: OffsetDateTime,
        is_published: bool,
        category: Option<Id<CategoryMarker>>,
        location: Option<Id<LocationMarker>>,
    ) -> Post {
        let fields = PostFields {
            category,
            location,
            is_published,
            ..self.fields(name, pub_date)
        };
        self.db.create_post(&fields, NOW - Duration::days(3)).await.unwrap()
    }
}
