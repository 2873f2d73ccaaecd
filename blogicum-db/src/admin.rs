//! Content management queries. Every write runs in its own transaction.

use crate::{
    client::{DbClient, Result},
    feed::{NEWEST_FIRST, SELECT_POSTS},
    record::{CategoryRecord, FullPostRecord, LocationRecord, PostFieldsRecord},
};
use blogicum_common::{
    model::{
        Id, ModelValidationError,
        category::{Category, CategoryFields, CategoryMarker, CategoryPatch},
        location::{Location, LocationFields, LocationMarker, LocationPatch},
        post::{Post, PostFields, PostMarker, PostPatch},
    },
    util::whole_seconds,
};
use sqlx::{
    FromRow, QueryBuilder, Sqlite, SqliteExecutor, query, query_as, query_scalar,
    sqlite::SqliteRow,
};
use time::OffsetDateTime;
use tracing::info;

/// One page of an admin listing.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct ListQuery<'a> {
    /// Substring matched against `search_fields`, ignoring ASCII case only.
    pub search: Option<&'a str>,
    pub search_fields: &'a [&'a str],
    pub limit: u32,
    pub offset: u32,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

const SELECT_LOCATIONS: &str = "
    SELECT location_id, name, is_published, created_at
    FROM locations
";

const SELECT_CATEGORIES: &str = "
    SELECT category_id, title, description, slug, is_published, created_at
    FROM categories
";

fn post_column(field: &str) -> Option<&'static str> {
    match field {
        "title" => Some("posts.title"),
        "text" => Some("posts.text"),
        "location" => Some("locations.name"),
        "category" => Some("categories.title"),
        _ => None,
    }
}

fn location_column(field: &str) -> Option<&'static str> {
    match field {
        "name" => Some("locations.name"),
        _ => None,
    }
}

fn category_column(field: &str) -> Option<&'static str> {
    match field {
        "title" => Some("categories.title"),
        "description" => Some("categories.description"),
        "slug" => Some("categories.slug"),
        _ => None,
    }
}

fn escape_like(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Appends ` WHERE (a LIKE ? OR b LIKE ? ...)` for the searchable columns, if any.
fn push_search<'a>(
    builder: &mut QueryBuilder<'a, Sqlite>,
    list: &ListQuery<'_>,
    column: fn(&str) -> Option<&'static str>,
) {
    let Some(search) = list.search.filter(|search| !search.trim().is_empty()) else {
        return;
    };
    let columns: Vec<_> = list
        .search_fields
        .iter()
        .filter_map(|field| column(field))
        .collect();
    if columns.is_empty() {
        return;
    }

    let pattern = escape_like(search.trim());
    builder.push(" WHERE (");
    let mut separated = builder.separated(" OR ");
    for column in columns {
        separated
            .push(column)
            .push_unseparated(" LIKE ")
            .push_bind_unseparated(pattern.clone())
            .push_unseparated(" ESCAPE '\\'");
    }
    builder.push(")");
}

impl DbClient {
    async fn fetch_page<R, T>(
        &self,
        select: &str,
        order: &str,
        list: &ListQuery<'_>,
        column: fn(&str) -> Option<&'static str>,
    ) -> Result<ListPage<T>>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        T: TryFrom<R, Error = ModelValidationError>,
    {
        let mut count_builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM ({select}"));
        push_search(&mut count_builder, list, column);
        count_builder.push(")");
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Sqlite>::new(select);
        push_search(&mut builder, list, column);
        builder
            .push(" ")
            .push(order)
            .push(" LIMIT ")
            .push_bind(list.limit)
            .push(" OFFSET ")
            .push_bind(list.offset);
        let records: Vec<R> = builder.build_query_as().fetch_all(&self.pool).await?;

        let items = records
            .into_iter()
            .map(T::try_from)
            .collect::<Result<_, _>>()?;
        Ok(ListPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    pub async fn fetch_location(
        &self,
        location_id: Id<LocationMarker>,
    ) -> Result<Option<Location>> {
        fetch_location_in(&self.pool, location_id).await
    }

    pub async fn fetch_locations(&self, list: &ListQuery<'_>) -> Result<ListPage<Location>> {
        self.fetch_page::<LocationRecord, _>(
            SELECT_LOCATIONS,
            "ORDER BY locations.location_id DESC",
            list,
            location_column,
        )
        .await
    }

    pub async fn create_location(
        &self,
        fields: &LocationFields,
        now: OffsetDateTime,
    ) -> Result<Location> {
        let mut transaction = self.pool.begin().await?;

        let location_id: i64 = query_scalar(
            "
            INSERT INTO locations (name, is_published, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING location_id
            ",
        )
        .bind(fields.name.get())
        .bind(fields.is_published)
        .bind(now.unix_timestamp())
        .fetch_one(&mut *transaction)
        .await?;

        let location = fetch_location_in(&mut *transaction, location_id.into())
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        transaction.commit().await?;

        info!(location_id, "Created location");
        Ok(location)
    }

    pub async fn update_location(
        &self,
        location_id: Id<LocationMarker>,
        patch: LocationPatch,
    ) -> Result<Option<Location>> {
        let mut transaction = self.pool.begin().await?;

        let Some(record) = query_as::<_, LocationRecord>(&format!(
            "{SELECT_LOCATIONS} WHERE location_id = ?1"
        ))
        .bind(location_id.get())
        .fetch_optional(&mut *transaction)
        .await?
        else {
            return Ok(None);
        };

        let mut fields = LocationFields::try_from(record)?;
        patch.apply(&mut fields);

        query("UPDATE locations SET name = ?1, is_published = ?2 WHERE location_id = ?3")
            .bind(fields.name.get())
            .bind(fields.is_published)
            .bind(location_id.get())
            .execute(&mut *transaction)
            .await?;

        let location = fetch_location_in(&mut *transaction, location_id).await?;
        transaction.commit().await?;

        info!(location_id = location_id.get(), "Updated location");
        Ok(location)
    }

    /// Deletes the location; posts that referenced it keep existing without one.
    pub async fn delete_location(&self, location_id: Id<LocationMarker>) -> Result<bool> {
        self.delete_row(
            "DELETE FROM locations WHERE location_id = ?1",
            "location",
            location_id.get(),
        )
        .await
    }

    pub async fn fetch_category(
        &self,
        category_id: Id<CategoryMarker>,
    ) -> Result<Option<Category>> {
        fetch_category_in(&self.pool, category_id).await
    }

    pub async fn fetch_categories(&self, list: &ListQuery<'_>) -> Result<ListPage<Category>> {
        self.fetch_page::<CategoryRecord, _>(
            SELECT_CATEGORIES,
            "ORDER BY categories.category_id DESC",
            list,
            category_column,
        )
        .await
    }

    pub async fn create_category(
        &self,
        fields: &CategoryFields,
        now: OffsetDateTime,
    ) -> Result<Category> {
        let mut transaction = self.pool.begin().await?;

        let category_id: i64 = query_scalar(
            "
            INSERT INTO categories (title, description, slug, is_published, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING category_id
            ",
        )
        .bind(fields.title.get())
        .bind(&fields.description)
        .bind(fields.slug.get())
        .bind(fields.is_published)
        .bind(now.unix_timestamp())
        .fetch_one(&mut *transaction)
        .await?;

        let category = fetch_category_in(&mut *transaction, category_id.into())
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        transaction.commit().await?;

        info!(category_id, slug = %category.slug, "Created category");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        category_id: Id<CategoryMarker>,
        patch: CategoryPatch,
    ) -> Result<Option<Category>> {
        let mut transaction = self.pool.begin().await?;

        let Some(record) = query_as::<_, CategoryRecord>(&format!(
            "{SELECT_CATEGORIES} WHERE category_id = ?1"
        ))
        .bind(category_id.get())
        .fetch_optional(&mut *transaction)
        .await?
        else {
            return Ok(None);
        };

        let mut fields = CategoryFields::try_from(record)?;
        patch.apply(&mut fields);

        query(
            "
            UPDATE categories
            SET title = ?1, description = ?2, slug = ?3, is_published = ?4
            WHERE category_id = ?5
            ",
        )
        .bind(fields.title.get())
        .bind(&fields.description)
        .bind(fields.slug.get())
        .bind(fields.is_published)
        .bind(category_id.get())
        .execute(&mut *transaction)
        .await?;

        let category = fetch_category_in(&mut *transaction, category_id).await?;
        transaction.commit().await?;

        info!(category_id = category_id.get(), "Updated category");
        Ok(category)
    }

    /// Deletes the category; its posts keep existing without one.
    pub async fn delete_category(&self, category_id: Id<CategoryMarker>) -> Result<bool> {
        self.delete_row(
            "DELETE FROM categories WHERE category_id = ?1",
            "category",
            category_id.get(),
        )
        .await
    }

    /// Any post, visible or not.
    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        fetch_post_in(&self.pool, post_id).await
    }

    pub async fn fetch_posts(&self, list: &ListQuery<'_>) -> Result<ListPage<Post>> {
        self.fetch_page::<FullPostRecord, _>(SELECT_POSTS, NEWEST_FIRST, list, post_column)
            .await
    }

    /// Fails with [`ModelValidationError::FractionalSeconds`] unless `pub_date` is a whole second.
    pub async fn create_post(&self, fields: &PostFields, now: OffsetDateTime) -> Result<Post> {
        let pub_date = whole_seconds(fields.pub_date).map_err(ModelValidationError::from)?;
        let mut transaction = self.pool.begin().await?;

        let post_id: i64 = query_scalar(
            "
            INSERT INTO posts (
                title, text, pub_date, is_published, created_at,
                author_id, location_id, category_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING post_id
            ",
        )
        .bind(fields.title.get())
        .bind(&fields.text)
        .bind(pub_date.unix_timestamp())
        .bind(fields.is_published)
        .bind(now.unix_timestamp())
        .bind(fields.author.get())
        .bind(fields.location.map(Id::get))
        .bind(fields.category.map(Id::get))
        .fetch_one(&mut *transaction)
        .await?;

        let post = fetch_post_in(&mut *transaction, post_id.into())
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        transaction.commit().await?;

        info!(post_id, "Created post");
        Ok(post)
    }

    pub async fn update_post(
        &self,
        post_id: Id<PostMarker>,
        patch: PostPatch,
    ) -> Result<Option<Post>> {
        let mut transaction = self.pool.begin().await?;

        let Some(record) = query_as::<_, PostFieldsRecord>(
            "
            SELECT title, text, pub_date, author_id, location_id, category_id, is_published
            FROM posts
            WHERE post_id = ?1
            ",
        )
        .bind(post_id.get())
        .fetch_optional(&mut *transaction)
        .await?
        else {
            return Ok(None);
        };

        let mut fields = PostFields::try_from(record)?;
        patch.apply(&mut fields);
        let pub_date = whole_seconds(fields.pub_date).map_err(ModelValidationError::from)?;

        query(
            "
            UPDATE posts
            SET
                title = ?1,
                text = ?2,
                pub_date = ?3,
                is_published = ?4,
                author_id = ?5,
                location_id = ?6,
                category_id = ?7
            WHERE post_id = ?8
            ",
        )
        .bind(fields.title.get())
        .bind(&fields.text)
        .bind(pub_date.unix_timestamp())
        .bind(fields.is_published)
        .bind(fields.author.get())
        .bind(fields.location.map(Id::get))
        .bind(fields.category.map(Id::get))
        .bind(post_id.get())
        .execute(&mut *transaction)
        .await?;

        let post = fetch_post_in(&mut *transaction, post_id).await?;
        transaction.commit().await?;

        info!(post_id = post_id.get(), "Updated post");
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: Id<PostMarker>) -> Result<bool> {
        self.delete_row("DELETE FROM posts WHERE post_id = ?1", "post", post_id.get())
            .await
    }

    async fn delete_row(&self, sql: &'static str, entity: &'static str, id: i64) -> Result<bool> {
        let mut transaction = self.pool.begin().await?;
        let deleted = query(sql)
            .bind(id)
            .execute(&mut *transaction)
            .await?
            .rows_affected()
            > 0;
        transaction.commit().await?;

        if deleted {
            info!(entity, id, "Deleted row");
        }
        Ok(deleted)
    }
}

async fn fetch_location_in<'e>(
    executor: impl SqliteExecutor<'e>,
    location_id: Id<LocationMarker>,
) -> Result<Option<Location>> {
    let record =
        query_as::<_, LocationRecord>(&format!("{SELECT_LOCATIONS} WHERE location_id = ?1"))
            .bind(location_id.get())
            .fetch_optional(executor)
            .await?;

    let location = record.map(Location::try_from).transpose()?;
    Ok(location)
}

async fn fetch_category_in<'e>(
    executor: impl SqliteExecutor<'e>,
    category_id: Id<CategoryMarker>,
) -> Result<Option<Category>> {
    let record =
        query_as::<_, CategoryRecord>(&format!("{SELECT_CATEGORIES} WHERE category_id = ?1"))
            .bind(category_id.get())
            .fetch_optional(executor)
            .await?;

    let category = record.map(Category::try_from).transpose()?;
    Ok(category)
}

async fn fetch_post_in<'e>(
    executor: impl SqliteExecutor<'e>,
    post_id: Id<PostMarker>,
) -> Result<Option<Post>> {
    let record =
        query_as::<_, FullPostRecord>(&format!("{SELECT_POSTS} WHERE posts.post_id = ?1"))
            .bind(post_id.get())
            .fetch_optional(executor)
            .await?;

    let post = record.map(Post::try_from).transpose()?;
    Ok(post)
}
