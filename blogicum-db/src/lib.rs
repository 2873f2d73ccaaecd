pub mod admin;
pub mod client;
pub mod feed;
mod record;
