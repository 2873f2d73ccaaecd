//! JSON administration of the blog. Every endpoint requires a staff token.

use crate::server::{Result, ServerError, ServerRouter, auth::StaffUser, extract::Json};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use blogicum_common::admin::{AdminSite, ModelAdmin};
use blogicum_db::admin::{ListPage, ListQuery};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

mod categories;
mod locations;
mod posts;
mod users;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(get_site)
        .merge(posts::routes())
        .merge(categories::routes())
        .merge(locations::routes())
        .merge(users::routes())
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/admin", rejection(ServerError))]
struct SitePath();

async fn get_site(
    SitePath(): SitePath,
    State(site): State<Arc<AdminSite>>,
    _: StaffUser,
) -> Json<AdminSite> {
    Json(AdminSite::clone(&site))
}

/// Query string of a listing: `?page=2&q=moscow`.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub q: Option<String>,
}

impl ListParams {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn query<'a>(&'a self, admin: &'a ModelAdmin) -> ListQuery<'a> {
        ListQuery {
            search: self.q.as_deref(),
            search_fields: admin.searchable_fields(),
            limit: admin.list_per_page,
            offset: admin.offset(self.page()),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct ListResponse {
    pub model: &'static str,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub rows: Vec<Map<String, Value>>,
}

impl ListResponse {
    /// Projects every item onto the columns `admin` displays.
    ///
    /// Every row must serialize to a JSON object.
    fn new<T, R: Serialize>(
        admin: &ModelAdmin,
        params: &ListParams,
        page: ListPage<T>,
        to_row: impl Fn(&T) -> R,
    ) -> Result<Self> {
        let rows = page
            .items
            .iter()
            .map(|item| -> Result<_> {
                let Value::Object(mut row) = serde_json::to_value(to_row(item))? else {
                    return Err(ServerError::ListRowNotObject(admin.model));
                };
                row.retain(|column, _| admin.displays(column));
                Ok(row)
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            model: admin.model,
            page: params.page(),
            per_page: admin.list_per_page,
            total: page.total,
            rows,
        })
    }
}

fn registered<'a>(site: &'a AdminSite, model: &'static str) -> Result<&'a ModelAdmin> {
    site.get(model).ok_or(ServerError::UnregisteredModel(model))
}
