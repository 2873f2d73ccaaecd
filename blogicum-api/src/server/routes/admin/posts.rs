use crate::server::{
    Result, ServerError, ServerRouter,
    auth::StaffUser,
    extract::{Json, Query},
    routes::admin::{ListParams, ListResponse, registered},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use blogicum_common::{
    admin::{AdminSite, POST_ADMIN},
    model::{
        Id,
        post::{Post, PostFields, PostMarker, PostPatch},
    },
};
use blogicum_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_patch(update_post)
        .typed_delete(delete_post)
}

#[derive(Serialize)]
struct PostRow {
    id: Id<PostMarker>,
    title: String,
    text: String,
    text_short: String,
    author: String,
    location: Option<String>,
    category: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub_date: OffsetDateTime,
    is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

fn post_row(post: &Post) -> PostRow {
    PostRow {
        id: post.id,
        title: post.title.get().to_owned(),
        text: post.text.clone(),
        text_short: post.text_short().into_owned(),
        author: post.author.username.get().to_owned(),
        location: post
            .location
            .as_ref()
            .map(|location| location.display_name().to_owned()),
        category: post
            .category
            .as_ref()
            .map(|category| category.display_name().to_owned()),
        pub_date: post.pub_date,
        is_published: post.publication.is_published,
        created_at: post.publication.created_at,
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/posts", rejection(ServerError))]
struct PostsPath();

async fn list_posts(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
    State(site): State<Arc<AdminSite>>,
    _: StaffUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let admin = registered(&site, POST_ADMIN.model)?;
    let page = db.fetch_posts(&params.query(admin)).await?;

    let response = ListResponse::new(admin, &params, page, post_row)?;
    Ok(Json(response))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
    Json(fields): Json<PostFields>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = db.create_post(&fields, OffsetDateTime::now_utc()).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

/// Unlike the public page, this finds unpublished and scheduled posts too.
async fn get_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
) -> Result<Json<Post>> {
    let post = db
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn update_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
    Json(patch): Json<PostPatch>,
) -> Result<Json<Post>> {
    let post = db
        .update_post(id, patch)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
) -> Result<StatusCode> {
    if db.delete_post(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::PostByIdNotFound(id))
    }
}
