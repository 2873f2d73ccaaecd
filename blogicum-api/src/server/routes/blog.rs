//! The public pages. Everything here only ever sees visible posts.

use crate::server::{PageError, ServerRouter, templates};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use blogicum_common::model::{Id, post::PostMarker};
use blogicum_db::client::DbClient;
use maud::Markup;
use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;

/// Posts shown on the home page.
pub const HOME_FEED_LIMIT: u32 = 5;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(index)
        .typed_get(post_detail)
        .typed_get(category_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/", rejection(PageError))]
struct IndexPath();

async fn index(
    IndexPath(): IndexPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Markup, PageError> {
    let posts = db
        .fetch_recent_posts(OffsetDateTime::now_utc(), HOME_FEED_LIMIT)
        .await?;

    Ok(templates::index(&posts))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(PageError))]
struct PostDetailPath {
    id: Id<PostMarker>,
}

async fn post_detail(
    PostDetailPath { id }: PostDetailPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Markup, PageError> {
    let post = db
        .fetch_visible_post(id, OffsetDateTime::now_utc())
        .await?
        .ok_or(PageError::PostByIdNotFound(id))?;

    Ok(templates::post_detail(&post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/category/{slug}", rejection(PageError))]
struct CategoryPostsPath {
    slug: String,
}

async fn category_posts(
    CategoryPostsPath { slug }: CategoryPostsPath,
    State(db): State<Arc<DbClient>>,
) -> Result<Markup, PageError> {
    let feed = db
        .fetch_category_feed(&slug, OffsetDateTime::now_utc())
        .await?
        .ok_or(PageError::CategoryBySlugNotFound(slug))?;

    Ok(templates::category_posts(&feed.category, &feed.posts))
}
