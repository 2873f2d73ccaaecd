mod common;

use blogicum_common::{
    model::{post::PostPatch, user::Username},
    util::PositiveDuration,
};
use common::{TestApp, now, yesterday};
use reqwest::{Method, StatusCode};
use serde_json::json;
use time::{Duration, format_description::well_known::Rfc3339};

#[tokio::test]
async fn admin_requires_a_staff_token() {
    let app = TestApp::spawn().await;

    let missing = app.request(Method::GET, "/admin", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request(Method::GET, "/admin", Some("not-a-token"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let forged = app
        .request(
            Method::GET,
            "/admin",
            Some("1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"),
            None,
        )
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

    let reader = app
        .request(Method::GET, "/admin", Some(&app.reader_token), None)
        .await;
    assert_eq!(reader.status, StatusCode::FORBIDDEN);
    assert_eq!(reader.body, json!({ "status": 403 }));

    let admin = app.admin(Method::GET, "/admin", None).await;
    assert_eq!(admin.status, StatusCode::OK);
    let models: Vec<_> = admin.body["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|model| model["model"].as_str().unwrap())
        .collect();
    assert_eq!(models, ["posts", "categories", "locations"]);
    assert_eq!(admin.body["models"][0]["list_per_page"], 10);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app
        .db
        .fetch_user_by_username(&Username::new("admin".to_owned()).unwrap())
        .await
        .unwrap()
        .unwrap();
    let expired = app
        .db
        .create_auth_token(
            admin.id,
            PositiveDuration::new(Duration::minutes(1)),
            now() - Duration::hours(1),
        )
        .await
        .unwrap();

    let res = app
        .request(Method::GET, "/admin", Some(&expired.as_token_str()), None)
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn category_crud() {
    let app = TestApp::spawn().await;

    let created = app
        .admin(
            Method::POST,
            "/admin/categories",
            Some(&json!({
                "title": "News",
                "description": "What happened",
                "slug": "news",
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["is_published"], true);
    let id = created.body["id"].as_i64().unwrap();

    let duplicate = app
        .admin(
            Method::POST,
            "/admin/categories",
            Some(&json!({ "title": "Other", "description": "", "slug": "news" })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let invalid = app
        .admin(
            Method::POST,
            "/admin/categories",
            Some(&json!({ "title": "Bad", "description": "", "slug": "not a slug" })),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let path = format!("/admin/categories/{id}");
    let patched = app
        .admin(Method::PATCH, &path, Some(&json!({ "is_published": false })))
        .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["is_published"], false);
    assert_eq!(patched.body["slug"], "news");
    assert_eq!(app.get("/category/news").await.status, StatusCode::NOT_FOUND);

    let fetched = app.admin(Method::GET, &path, None).await;
    assert_eq!(fetched.body, patched.body);

    let deleted = app.admin(Method::DELETE, &path, None).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    let gone = app.admin(Method::GET, &path, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body, json!({ "status": 404 }));
}

#[tokio::test]
async fn post_patch_clears_category() {
    let app = TestApp::spawn().await;
    let news = app.category("news", true).await;
    let post = app
        .post("Headline", yesterday(), true, Some(news.id), None)
        .await;
    let path = format!("/admin/posts/{}", post.id);

    let untouched = app
        .admin(Method::PATCH, &path, Some(&json!({ "title": "Renamed" })))
        .await;
    assert_eq!(untouched.status, StatusCode::OK);
    assert_eq!(untouched.body["title"], "Renamed");
    assert_eq!(untouched.body["category"]["slug"], "news");

    let cleared = app
        .admin(Method::PATCH, &path, Some(&json!({ "category": null })))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.body["category"].is_null());
}

#[tokio::test]
async fn post_with_unknown_author_is_rejected() {
    let app = TestApp::spawn().await;
    let pub_date = yesterday().format(&Rfc3339).unwrap();

    let res = app
        .admin(
            Method::POST,
            "/admin/posts",
            Some(&json!({
                "title": "Orphan",
                "text": "Nobody wrote this",
                "pub_date": pub_date,
                "author": 9999,
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let res = app
        .admin(
            Method::POST,
            "/admin/posts",
            Some(&json!({
                "title": "Adopted",
                "text": "Somebody wrote this",
                "pub_date": pub_date,
                "author": app.author.id,
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["author"]["username"], "author");
    assert!(res.body["location"].is_null());
}

#[tokio::test]
async fn fractional_pub_date_is_a_bad_request() {
    let app = TestApp::spawn().await;

    let res = app
        .admin(
            Method::POST,
            "/admin/posts",
            Some(&json!({
                "title": "Split second",
                "text": "Scheduled to the millisecond",
                "pub_date": "2025-06-15T12:00:00.900Z",
                "author": app.author.id,
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let post = app.post("Whole", yesterday(), true, None, None).await;
    let res = app
        .admin(
            Method::PATCH,
            &format!("/admin/posts/{}", post.id),
            Some(&json!({ "pub_date": "2025-06-15T12:00:00.5Z" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let listed = app.admin(Method::GET, "/admin/posts", None).await;
    assert_eq!(listed.body["total"], 1);
}

#[tokio::test]
async fn post_list_shows_display_columns() {
    let app = TestApp::spawn().await;
    let long_name = "L".repeat(40);
    let location = app.location(&long_name, true).await;
    let text = "x".repeat(200);
    let post = app
        .post("Long", yesterday(), false, None, Some(location.id))
        .await;
    app.db
        .update_post(
            post.id,
            PostPatch {
                text: Some(text),
                ..PostPatch::default()
            },
        )
        .await
        .unwrap();

    let res = app.admin(Method::GET, "/admin/posts", None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["total"], 1);
    let row = &res.body["rows"][0];
    assert_eq!(row["id"], post.id.get());
    assert_eq!(row["text_short"], format!("{}...", "x".repeat(150)));
    assert_eq!(row["location"], "L".repeat(30));
    assert_eq!(row["is_published"], false);
    assert!(row.get("text").is_none());
    assert!(row.get("author").is_none());
    assert!(row.get("created_at").is_none());
}

#[tokio::test]
async fn location_list_is_paged_and_searchable() {
    let app = TestApp::spawn().await;
    for index in 0..12 {
        app.location(&format!("Place {index:02}"), true).await;
    }
    app.location("Moscow", true).await;

    let first = app.admin(Method::GET, "/admin/locations", None).await;
    assert_eq!(first.body["total"], 13);
    assert_eq!(first.body["page"], 1);
    assert_eq!(first.body["rows"].as_array().unwrap().len(), 10);

    let second = app
        .admin(Method::GET, "/admin/locations?page=2", None)
        .await;
    assert_eq!(second.body["rows"].as_array().unwrap().len(), 3);

    let search = app
        .admin(Method::GET, "/admin/locations?q=mosc", None)
        .await;
    assert_eq!(search.body["total"], 1);
    assert_eq!(search.body["rows"][0]["name"], "Moscow");

    let bad_page = app
        .admin(Method::GET, "/admin/locations?page=first", None)
        .await;
    assert_eq!(bad_page.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn users_and_tokens() {
    let app = TestApp::spawn().await;

    let created = app
        .admin(
            Method::POST,
            "/admin/users",
            Some(&json!({ "username": "editor", "is_staff": true })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();

    let duplicate = app
        .admin(Method::POST, "/admin/users", Some(&json!({ "username": "editor" })))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let issued = app
        .admin(
            Method::POST,
            &format!("/admin/users/{id}/tokens"),
            Some(&json!({ "expires_after_seconds": 3600 })),
        )
        .await;
    assert_eq!(issued.status, StatusCode::CREATED);
    let token = issued.body["token"].as_str().unwrap().to_owned();

    let with_new_token = app
        .request(Method::GET, "/admin", Some(&token), None)
        .await;
    assert_eq!(with_new_token.status, StatusCode::OK);

    let negative = app
        .admin(
            Method::POST,
            &format!("/admin/users/{id}/tokens"),
            Some(&json!({ "expires_after_seconds": -5 })),
        )
        .await;
    assert_eq!(negative.status, StatusCode::UNPROCESSABLE_ENTITY);

    let beyond_calendar = app
        .admin(
            Method::POST,
            &format!("/admin/users/{id}/tokens"),
            Some(&json!({ "expires_after_seconds": i64::MAX })),
        )
        .await;
    assert_eq!(beyond_calendar.status, StatusCode::UNPROCESSABLE_ENTITY);

    let still_served = app.admin(Method::GET, "/admin", None).await;
    assert_eq!(still_served.status, StatusCode::OK);

    let deleted = app
        .admin(Method::DELETE, &format!("/admin/users/{id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let revoked = app
        .request(Method::GET, "/admin", Some(&token), None)
        .await;
    assert_eq!(revoked.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .admin(Method::POST, "/admin/users/9999/tokens", Some(&json!({})))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}
