use crate::server::{
    Result, ServerError, ServerRouter,
    auth::StaffUser,
    extract::{Json, Query},
    routes::admin::{ListParams, ListResponse, registered},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use blogicum_common::{
    admin::{AdminSite, LOCATION_ADMIN},
    model::{
        Id,
        location::{Location, LocationFields, LocationMarker, LocationPatch},
    },
};
use blogicum_db::client::DbClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(list_locations)
        .typed_post(create_location)
        .typed_get(get_location)
        .typed_patch(update_location)
        .typed_delete(delete_location)
}

#[derive(Serialize)]
struct LocationRow {
    id: Id<LocationMarker>,
    name: String,
    is_published: bool,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

fn location_row(location: &Location) -> LocationRow {
    LocationRow {
        id: location.id,
        name: location.name.get().to_owned(),
        is_published: location.publication.is_published,
        created_at: location.publication.created_at,
    }
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/locations", rejection(ServerError))]
struct LocationsPath();

async fn list_locations(
    LocationsPath(): LocationsPath,
    State(db): State<Arc<DbClient>>,
    State(site): State<Arc<AdminSite>>,
    _: StaffUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let admin = registered(&site, LOCATION_ADMIN.model)?;
    let page = db.fetch_locations(&params.query(admin)).await?;

    let response = ListResponse::new(admin, &params, page, location_row)?;
    Ok(Json(response))
}

async fn create_location(
    LocationsPath(): LocationsPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
    Json(fields): Json<LocationFields>,
) -> Result<(StatusCode, Json<Location>)> {
    let location = db
        .create_location(&fields, OffsetDateTime::now_utc())
        .await?;

    Ok((StatusCode::CREATED, Json(location)))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin/locations/{id}", rejection(ServerError))]
struct LocationPath {
    id: Id<LocationMarker>,
}

async fn get_location(
    LocationPath { id }: LocationPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
) -> Result<Json<Location>> {
    let location = db
        .fetch_location(id)
        .await?
        .ok_or(ServerError::LocationByIdNotFound(id))?;

    Ok(Json(location))
}

async fn update_location(
    LocationPath { id }: LocationPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
    Json(patch): Json<LocationPatch>,
) -> Result<Json<Location>> {
    let location = db
        .update_location(id, patch)
        .await?
        .ok_or(ServerError::LocationByIdNotFound(id))?;

    Ok(Json(location))
}

async fn delete_location(
    LocationPath { id }: LocationPath,
    State(db): State<Arc<DbClient>>,
    _: StaffUser,
) -> Result<StatusCode> {
    if db.delete_location(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::LocationByIdNotFound(id))
    }
}
