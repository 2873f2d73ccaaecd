//! Read-only queries behind the public pages.
//!
//! Every query here applies [`VISIBLE_POSTS`] in SQL, the database-side form of
//! [`Post::is_visible_at`](blogicum_common::model::post::Post::is_visible_at).

use crate::{
    client::{DbClient, Result},
    record::{CategoryRecord, FullPostRecord},
};
use blogicum_common::model::{
    Id,
    category::Category,
    post::{Post, PostMarker},
};
use sqlx::query_as;
use std::sync::LazyLock;
use time::OffsetDateTime;

/// Posts joined with everything a page shows about them.
pub(crate) const SELECT_POSTS: &str = "
    SELECT
        posts.post_id,
        posts.title,
        posts.text,
        posts.pub_date,
        posts.is_published,
        posts.created_at,
        users.user_id AS author_id,
        users.username AS author_username,
        users.is_staff AS author_is_staff,
        users.created_at AS author_created_at,
        locations.location_id,
        locations.name AS location_name,
        locations.is_published AS location_is_published,
        locations.created_at AS location_created_at,
        categories.category_id,
        categories.title AS category_title,
        categories.description AS category_description,
        categories.slug AS category_slug,
        categories.is_published AS category_is_published,
        categories.created_at AS category_created_at
    FROM
        posts
        JOIN users ON users.user_id = posts.author_id
        LEFT JOIN locations ON locations.location_id = posts.location_id
        LEFT JOIN categories ON categories.category_id = posts.category_id
";

/// Visibility condition; `?1` is the current time in Unix seconds.
pub(crate) const VISIBLE_POSTS: &str = "
    posts.is_published = TRUE
    AND posts.pub_date <= ?1
    AND (posts.category_id IS NULL OR categories.is_published = TRUE)
";

pub(crate) const NEWEST_FIRST: &str = "ORDER BY posts.pub_date DESC, posts.post_id DESC";

static RECENT_POSTS: LazyLock<String> = LazyLock::new(|| {
    format!("{SELECT_POSTS} WHERE {VISIBLE_POSTS} {NEWEST_FIRST} LIMIT ?2")
});

static VISIBLE_POST_BY_ID: LazyLock<String> =
    LazyLock::new(|| format!("{SELECT_POSTS} WHERE {VISIBLE_POSTS} AND posts.post_id = ?2"));

static CATEGORY_POSTS: LazyLock<String> = LazyLock::new(|| {
    format!("{SELECT_POSTS} WHERE {VISIBLE_POSTS} AND posts.category_id = ?2 {NEWEST_FIRST}")
});

/// A published category and its visible posts, newest first.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CategoryFeed {
    pub category: Category,
    pub posts: Vec<Post>,
}

impl DbClient {
    /// At most `limit` visible posts, newest first.
    pub async fn fetch_recent_posts(&self, now: OffsetDateTime, limit: u32) -> Result<Vec<Post>> {
        let records = query_as::<_, FullPostRecord>(&RECENT_POSTS)
            .bind(now.unix_timestamp())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(posts)
    }

    /// The post with `post_id` if it is visible at `now`.
    ///
    /// Hidden and missing posts are indistinguishable.
    pub async fn fetch_visible_post(
        &self,
        post_id: Id<PostMarker>,
        now: OffsetDateTime,
    ) -> Result<Option<Post>> {
        let record = query_as::<_, FullPostRecord>(&VISIBLE_POST_BY_ID)
            .bind(now.unix_timestamp())
            .bind(post_id.get())
            .fetch_optional(&self.pool)
            .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    /// The category with `slug`, unless it is unpublished.
    pub async fn fetch_published_category(&self, slug: &str) -> Result<Option<Category>> {
        let record = query_as::<_, CategoryRecord>(
            "
            SELECT category_id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = ?1 AND is_published = TRUE
            ",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        let category = record.map(Category::try_from).transpose()?;
        Ok(category)
    }

    /// The feed of the published category with `slug`.
    ///
    /// `None` when the slug does not name a published category; its posts are
    /// not queried at all in that case.
    pub async fn fetch_category_feed(
        &self,
        slug: &str,
        now: OffsetDateTime,
    ) -> Result<Option<CategoryFeed>> {
        let Some(category) = self.fetch_published_category(slug).await? else {
            return Ok(None);
        };

        let records = query_as::<_, FullPostRecord>(&CATEGORY_POSTS)
            .bind(now.unix_timestamp())
            .bind(category.id.get())
            .fetch_all(&self.pool)
            .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Some(CategoryFeed { category, posts }))
    }
}
