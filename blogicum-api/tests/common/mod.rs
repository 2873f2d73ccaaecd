#![allow(dead_code)]

use blogicum_api::server::{self, ServerState};
use blogicum_common::model::{
    Id,
    category::{Category, CategoryFields, CategoryMarker, Slug},
    location::{Location, LocationFields, LocationMarker},
    post::{Post, PostFields},
    title::Title,
    user::{CreateUser, User, Username},
};
use blogicum_db::client::DbClient;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::net::SocketAddr;
use time::{Duration, OffsetDateTime};

/// A running server on an ephemeral port, backed by its own in-memory database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DbClient,
    pub author: User,
    /// Bearer token of a staff user.
    pub admin_token: String,
    /// Bearer token of a user without staff rights.
    pub reader_token: String,
}

/// Parsed HTTP response for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub text: String,
    /// `Null` unless the body is JSON.
    pub body: Value,
}

pub fn title(title: &str) -> Title {
    Title::new(title.to_owned()).unwrap()
}

/// Current time without its fractional second, as stored post dates are whole seconds.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc().replace_nanosecond(0).unwrap()
}

pub fn yesterday() -> OffsetDateTime {
    now() - Duration::days(1)
}

pub fn tomorrow() -> OffsetDateTime {
    now() + Duration::days(1)
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = DbClient::connect_in_memory().await.unwrap();

        let author = create_user(&db, "author", false).await;
        let admin = create_user(&db, "admin", true).await;
        let admin_token = db
            .create_auth_token(admin.id, None, now())
            .await
            .unwrap()
            .as_token_str();
        let reader_token = db
            .create_auth_token(author.id, None, now())
            .await
            .unwrap()
            .as_token_str();

        let app = server::app(ServerState::new(db.clone()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            author,
            admin_token,
            reader_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        TestResponse::from_response(res).await
    }

    /// Sends `body` as JSON when given, with `token` as bearer token when given.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let res = request.send().await.unwrap();
        TestResponse::from_response(res).await
    }

    pub async fn admin(&self, method: Method, path: &str, body: Option<&Value>) -> TestResponse {
        self.request(method, path, Some(&self.admin_token), body)
            .await
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
                now(),
            )
            .await
            .unwrap()
    }

    pub async fn location(&self, name: &str, is_published: bool) -> Location {
        self.db
            .create_location(
                &LocationFields {
                    name: title(name),
                    is_published,
                },
                now(),
            )
            .await
            .unwrap()
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
            title: title(name),
            text: format!("Text of {name}"),
            pub_date,
            author: self.author.id,
            location,
            category,
            is_published,
        };
        self.db.create_post(&fields, now()).await.unwrap()
    }
}

async fn create_user(db: &DbClient, username: &str, is_staff: bool) -> User {
    db.create_user(
        &CreateUser {
            username: Username::new(username.to_owned()).unwrap(),
            is_staff,
        },
        now(),
    )
    .await
    .unwrap()
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status();
        let text = res.text().await.unwrap();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Self { status, text, body }
    }
}
