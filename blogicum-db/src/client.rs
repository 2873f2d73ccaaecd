use crate::record::{AuthenticationRecord, UserRecord};
use blogicum_common::{
    model::{
        Id, ModelValidationError,
        auth::{AuthToken, AuthTokenHashError, AuthTokenMarker, AuthTokenSalt, Authentication},
        user::{CreateUser, User, UserMarker, Username},
    },
    util::PositiveDuration,
};
use sqlx::{
    SqliteExecutor, SqlitePool,
    migrate::MigrateError,
    query, query_as, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("A unique value is already taken: {0}")]
    UniqueViolation(sqlx::Error),
    #[error("A referenced object does not exist: {0}")]
    ForeignKeyViolation(sqlx::Error),
    #[error(transparent)]
    AuthTokenHash(#[from] AuthTokenHashError),
    #[error(transparent)]
    Migrate(#[from] MigrateError),
    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(value: sqlx::Error) -> Self {
        let (unique, foreign_key) = match &value {
            sqlx::Error::Database(err) => {
                (err.is_unique_violation(), err.is_foreign_key_violation())
            }
            _ => (false, false),
        };

        if unique {
            Self::UniqueViolation(value)
        } else if foreign_key {
            Self::ForeignKeyViolation(value)
        } else {
            Self::Sqlx(value)
        }
    }
}

#[derive(Clone, Debug)]
pub struct DbClient {
    pub(crate) pool: SqlitePool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` with foreign keys enforced.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// A private in-memory database, migrated and ready to use.
    ///
    /// Every connection to `:memory:` is its own database, so the pool keeps exactly one.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let client = Self::new(pool);
        client.migrate().await?;
        Ok(client)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn fetch_user(&self, user_id: Id<UserMarker>) -> Result<Option<User>> {
        fetch_user_in(&self.pool, user_id).await
    }

    pub async fn fetch_user_by_username(&self, username: &Username) -> Result<Option<User>> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT user_id, username, is_staff, created_at
            FROM users
            WHERE username = ?1
            ",
        )
        .bind(username.get())
        .fetch_optional(&self.pool)
        .await?;

        let user = record.map(User::try_from).transpose()?;
        Ok(user)
    }

    pub async fn create_user(&self, user: &CreateUser, now: OffsetDateTime) -> Result<User> {
        let mut transaction = self.pool.begin().await?;

        let user_id: i64 = query_scalar(
            "
            INSERT INTO users (username, is_staff, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING user_id
            ",
        )
        .bind(user.username.get())
        .bind(user.is_staff)
        .bind(now.unix_timestamp())
        .fetch_one(&mut *transaction)
        .await?;

        let created = fetch_user_in(&mut *transaction, user_id.into())
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        transaction.commit().await?;

        info!(user_id, "Created user");
        Ok(created)
    }

    /// Deletes the user together with their posts and tokens.
    pub async fn delete_user(&self, user_id: Id<UserMarker>) -> Result<bool> {
        let mut transaction = self.pool.begin().await?;

        let deleted = query("DELETE FROM users WHERE user_id = ?1")
            .bind(user_id.get())
            .execute(&mut *transaction)
            .await?
            .rows_affected()
            > 0;
        transaction.commit().await?;

        if deleted {
            info!(user_id = user_id.get(), "Deleted user");
        }
        Ok(deleted)
    }

    /// Issues a new token for `user`. The returned token is the only copy of its secret.
    pub async fn create_auth_token(
        &self,
        user: Id<UserMarker>,
        expires_after: Option<PositiveDuration>,
        now: OffsetDateTime,
    ) -> Result<AuthToken> {
        let secret = AuthToken::generate_secret();
        let salt = AuthTokenSalt::generate_random();

        let mut transaction = self.pool.begin().await?;

        // The id is only known after the insert, so the hash is filled in afterwards.
        let token_id: i64 = query_scalar(
            "
            INSERT INTO auth_tokens (user_id, salt, token_hash, created_at, expires_after_seconds)
            VALUES (?1, ?2, x'', ?3, ?4)
            RETURNING token_id
            ",
        )
        .bind(user.get())
        .bind(&salt.0[..])
        .bind(now.unix_timestamp())
        .bind(expires_after.map(|duration| duration.get().whole_seconds()))
        .fetch_one(&mut *transaction)
        .await?;

        let token = AuthToken {
            id: token_id.into(),
            secret,
        };
        let token_hash = token.hash(&salt)?;

        query("UPDATE auth_tokens SET token_hash = ?1 WHERE token_id = ?2")
            .bind(&token_hash.0[..])
            .bind(token_id)
            .execute(&mut *transaction)
            .await?;
        transaction.commit().await?;

        info!(token_id, user_id = user.get(), "Issued auth token");
        Ok(token)
    }

    pub async fn fetch_auth(
        &self,
        token_id: Id<AuthTokenMarker>,
    ) -> Result<Option<Authentication>> {
        let record = query_as::<_, AuthenticationRecord>(
            "
            SELECT token_id, user_id, salt, token_hash, created_at, expires_after_seconds
            FROM auth_tokens
            WHERE token_id = ?1
            ",
        )
        .bind(token_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let authentication = record.map(Authentication::try_from).transpose()?;
        Ok(authentication)
    }
}

pub(crate) async fn fetch_user_in<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: Id<UserMarker>,
) -> Result<Option<User>> {
    let record = query_as::<_, UserRecord>(
        "
        SELECT user_id, username, is_staff, created_at
        FROM users
        WHERE user_id = ?1
        ",
    )
    .bind(user_id.get())
    .fetch_optional(executor)
    .await?;

    let user = record.map(User::try_from).transpose()?;
    Ok(user)
}
