//! # Post Repository
//!
//! Posts are stored as a temporal chain: every version is its own row,
//! rows of one post share `id`, and at most one row per `id` is actual.
//!
//! ## Chain State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   NoVersion ──add──► Active(v1)                                         │
//! │                        │                                                │
//! │                        ├──update──► v1 inactive + Active(v2)  (+1 row)  │
//! │                        │                                                │
//! │                        └──delete──► Inactive(v_last)          (+0 rows) │
//! │                                        │                                │
//! │                                        ├──restore──► Active(v_last)     │
//! │                                        ├──update───► ElementDeleted     │
//! │                                        └──delete───► ElementDeleted     │
//! │                                                                         │
//! │   Enforced by: UNIQUE (id) WHERE is_actual = 1                          │
//! │                UNIQUE (name) WHERE is_actual = 1                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use giftshop_core::{new_id, CoreError, CoreResult, Post, PostStorage};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{finish, StorageResultExt};
use crate::error::DbError;

const POST_COLUMNS: &str = "version_id, id, name, post_type, salary, is_actual, change_date";

/// Repository for post version chains.
#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    /// Creates a new PostRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PostRepository { pool }
    }
}

/// Most recent version of a post, actual or not.
async fn latest_version(conn: &mut SqliteConnection, post_id: &str) -> CoreResult<Option<Post>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE id = ?1 ORDER BY change_date DESC, rowid DESC LIMIT 1"
    );
    sqlx::query_as::<_, Post>(&sql)
        .bind(post_id)
        .fetch_optional(&mut *conn)
        .await
        .storage("reading post")
}

async fn insert_version(conn: &mut SqliteConnection, post: &Post, context: &str) -> CoreResult<()> {
    let version_id = new_id();
    debug!(post_id = %post.id, version_id = %version_id, name = %post.name, "Appending post version");

    sqlx::query(
        r#"
        INSERT INTO posts (version_id, id, name, post_type, salary, is_actual, change_date)
        VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
        "#,
    )
    .bind(&version_id)
    .bind(&post.id)
    .bind(&post.name)
    .bind(post.post_type)
    .bind(post.salary)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .storage_unique(context, |field| match field {
        "name" => post.name.clone(),
        _ => post.id.clone(),
    })?;

    Ok(())
}

async fn supersede(conn: &mut SqliteConnection, post: &Post) -> CoreResult<()> {
    let current = latest_version(conn, &post.id)
        .await?
        .ok_or_else(|| CoreError::not_found(&post.id))?;

    if !current.is_actual {
        return Err(CoreError::deleted(&post.id));
    }

    let result = sqlx::query("UPDATE posts SET is_actual = 0 WHERE version_id = ?1 AND is_actual = 1")
        .bind(&current.version_id)
        .execute(&mut *conn)
        .await
        .storage("deactivating post version")?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "post {} was modified concurrently",
            post.id
        ))
        .into_core("updating post"));
    }

    insert_version(conn, post, "updating post").await
}

async fn deactivate(conn: &mut SqliteConnection, post_id: &str) -> CoreResult<()> {
    let result = sqlx::query("UPDATE posts SET is_actual = 0 WHERE id = ?1 AND is_actual = 1")
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .storage("deleting post")?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    match latest_version(conn, post_id).await? {
        Some(_) => Err(CoreError::deleted(post_id)),
        None => Err(CoreError::not_found(post_id)),
    }
}

async fn reactivate(conn: &mut SqliteConnection, post_id: &str) -> CoreResult<()> {
    let latest = latest_version(conn, post_id)
        .await?
        .ok_or_else(|| CoreError::not_found(post_id))?;

    if latest.is_actual {
        return Ok(());
    }

    sqlx::query("UPDATE posts SET is_actual = 1 WHERE version_id = ?1")
        .bind(&latest.version_id)
        .execute(&mut *conn)
        .await
        .storage_unique("restoring post", |_| latest.name.clone())?;

    Ok(())
}

#[async_trait]
impl PostStorage for PostRepository {
    async fn list(&self, only_actual: bool) -> CoreResult<Vec<Post>> {
        debug!(only_actual, "Listing posts");

        let sql = if only_actual {
            format!("SELECT {POST_COLUMNS} FROM posts WHERE is_actual = 1 ORDER BY name")
        } else {
            format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id, change_date DESC, rowid DESC")
        };

        sqlx::query_as::<_, Post>(&sql)
            .fetch_all(&self.pool)
            .await
            .storage("listing posts")
    }

    async fn get_history(&self, post_id: &str) -> CoreResult<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?1 ORDER BY change_date DESC, rowid DESC"
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .storage("reading post history")
    }

    async fn get_by_id(&self, post_id: &str) -> CoreResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1 AND is_actual = 1");
        sqlx::query_as::<_, Post>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .storage("reading post")
    }

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE name = ?1 AND is_actual = 1");
        sqlx::query_as::<_, Post>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .storage("reading post")
    }

    async fn add(&self, post: &Post) -> CoreResult<()> {
        debug!(id = %post.id, name = %post.name, "Inserting post");

        let mut conn = self.pool.acquire().await.storage("acquiring connection")?;
        insert_version(&mut *conn, post, "adding post").await
    }

    async fn update(&self, post: &Post) -> CoreResult<()> {
        debug!(id = %post.id, name = %post.name, "Updating post");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = supersede(&mut *tx, post).await;
        finish(tx, result, "updating post").await
    }

    async fn delete(&self, post_id: &str) -> CoreResult<()> {
        debug!(id = %post_id, "Deleting post");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = deactivate(&mut *tx, post_id).await;
        finish(tx, result, "deleting post").await
    }

    async fn restore(&self, post_id: &str) -> CoreResult<()> {
        debug!(id = %post_id, "Restoring post");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = reactivate(&mut *tx, post_id).await;
        finish(tx, result, "restoring post").await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
