use crate::server::ServerRouter;
use axum::Router;

mod admin;
mod blog;

pub fn routes() -> ServerRouter {
    Router::new().merge(blog::routes()).merge(admin::routes())
}
