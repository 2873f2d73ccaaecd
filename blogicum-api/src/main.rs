use blogicum_api::server::{self, ServerState};
use blogicum_common::model::user::{CreateUser, Username};
use blogicum_db::client::{DbClient, DbError};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error preparing database: {0}")]
    Database(#[from] DbError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn default_database_url() -> String {
    "sqlite://blogicum.sqlite3".to_owned()
}

fn default_database_max_connections() -> u32 {
    5
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    #[serde(default = "default_database_url")]
    database_url: String,
    #[serde(default = "default_database_max_connections")]
    database_max_connections: u32,
    /// Staff user ensured at startup, receiving a fresh token.
    bootstrap_admin: Option<Username>,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "blogicum_api=debug,blogicum_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

async fn bootstrap_admin(db: &DbClient, username: Username) -> Result<(), DbError> {
    let now = OffsetDateTime::now_utc();

    let user = match db.fetch_user_by_username(&username).await? {
        Some(user) => user,
        None => {
            db.create_user(
                &CreateUser {
                    username,
                    is_staff: true,
                },
                now,
            )
            .await?
        }
    };

    if !user.is_staff {
        warn!(
            username = %user.username,
            "Bootstrap admin exists but is not staff, no token issued"
        );
        return Ok(());
    }

    let token = db.create_auth_token(user.id, None, now).await?;
    info!(
        username = %user.username,
        token = %token.as_token_str(),
        "Bootstrap admin token issued"
    );
    Ok(())
}

fn shutdown_on_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Could not listen for ctrl-c");
            return;
        }
        info!("Shutting down");
        shutdown.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let db_client = DbClient::connect(&env.database_url, env.database_max_connections).await?;
    db_client.migrate().await?;
    if let Some(username) = env.bootstrap_admin {
        bootstrap_admin(&db_client, username).await?;
    }

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::app(ServerState::new(db_client)).layer(tracing_layer);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    let shutdown = CancellationToken::new();
    shutdown_on_ctrl_c(shutdown.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
