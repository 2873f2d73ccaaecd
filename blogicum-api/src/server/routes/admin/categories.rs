use crate::server::{
    Result, ServerError, ServerRouter,
    auth::StaffUser,
    extract::{Json, Query},
    routes::admin::{ListParams, ListResponse, registered},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use blogicum_common::{
    admin::{AdminSite, CATEGORY_ADMIN},
    model::{
        Id,
        category::{Category, CategoryFields, CategoryMarker, CategoryPatch},
    },
};
use blogicum_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_categories)
        .typed_post(create_category)
        .typed_get(get_category)
        .typed_patch(update_category)
        .typed_delete(delete_category)
}

#[derive(Serialize)]
struct CategoryRow {
    id: Id<CategoryMarker>,
    title: String,
    description: String,
    description_short: String,
    slug: String,
    is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

fn category_row(category: &Category) -> CategoryRow {
    CategoryRow {
        id: category.id,
        title: category.title.get().to_owned(),
        description: category.description.clone(),
        description_short: category.description_short().into_owned(),
        slug: category.slug.get().to_owned(),
        is_published: category.publication.is_published,
        created_at: category.publication.created_at,
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/categories", rejection(ServerError))]
struct CategoriesPath();

async fn list_categories(
    CategoriesPath(): CategoriesPath,
    State(db): State<Arc<DbClient>>,
    State(site): State<Arc<AdminSite>>,
    _: StaffUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let admin = registered(&site, CATEGORY_ADMIN.model)?;
    let page = db.fetch_categories(&params.query(admin)).await?;

    let response = ListResponse::new(admin, &params, page, category_row)?;
    Ok(Json(response))
}

async fn create_category(
    CategoriesPath(): CategoriesPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
    Json(fields): Json<CategoryFields>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = db
        .create_category(&fields, OffsetDateTime::now_utc())
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/categories/{id}", rejection(ServerError))]
struct CategoryPath {
    id: Id<CategoryMarker>,
}

async fn get_category(
    CategoryPath { id }: CategoryPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
) -> Result<Json<Category>> {
    let category = db
        .fetch_category(id)
        .await?
        .ok_or(ServerError::CategoryByIdNotFound(id))?;

    Ok(Json(category))
}

async fn update_category(
    CategoryPath { id }: CategoryPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>> {
    let category = db
        .update_category(id, patch)
        .await?
        .ok_or(ServerError::CategoryByIdNotFound(id))?;

    Ok(Json(category))
}

/// Posts of the deleted category stay, uncategorized.
async fn delete_category(
    CategoryPath { id }: CategoryPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
) -> Result<StatusCode> {
    if db.delete_category(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::CategoryByIdNotFound(id))
    }
}
