//! # Post Logic
//!
//! Posts are versioned. `update_post` appends a version, `delete_post`
//! deactivates the actual one and `restore_post` reactivates the latest.

use std::sync::Arc;

use giftshop_core::validation::is_uuid;
use giftshop_core::{CoreResult, Post, PostStorage, Validate};
use tracing::info;

use crate::{found, require_argument, require_id};

#[derive(Clone)]
pub struct PostLogic {
    storage: Arc<dyn PostStorage>,
}

impl PostLogic {
    pub fn new(storage: Arc<dyn PostStorage>) -> Self {
        PostLogic { storage }
    }

    pub async fn get_all_posts(&self, only_actual: bool) -> CoreResult<Vec<Post>> {
        info!(only_actual, "get_all_posts");
        self.storage.list(only_actual).await
    }

    /// Every version of a post, most recent first.
    pub async fn get_post_history(&self, post_id: &str) -> CoreResult<Vec<Post>> {
        info!(post_id, "get_post_history");
        require_id("post_id", post_id)?;
        self.storage.get_history(post_id).await
    }

    pub async fn get_post_by_data(&self, data: &str) -> CoreResult<Post> {
        info!(data, "get_post_by_data");
        require_argument("data", data)?;

        let post = if is_uuid(data) {
            self.storage.get_by_id(data).await?
        } else {
            self.storage.get_by_name(data).await?
        };
        found(post, data)
    }

    pub async fn insert_post(&self, post: &Post) -> CoreResult<()> {
        info!(?post, "insert_post");
        post.validate()?;
        self.storage.add(post).await
    }

    pub async fn update_post(&self, post: &Post) -> CoreResult<()> {
        info!(?post, "update_post");
        post.validate()?;
        self.storage.update(post).await
    }

    pub async fn delete_post(&self, id: &str) -> CoreResult<()> {
        info!(id, "delete_post");
        require_id("id", id)?;
        self.storage.delete(id).await
    }

    pub async fn restore_post(&self, id: &str) -> CoreResult<()> {
        info!(id, "restore_post");
        require_id("id", id)?;
        self.storage.restore(id).await
    }
}
