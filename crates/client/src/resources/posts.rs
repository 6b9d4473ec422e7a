//! Blog posts (`/v2/blog/posts`).

use bigcommerce_core::PostId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::nullable;
use crate::client::Client;
use crate::error::BigCommerceError;
use crate::pagination::{IncompleteFetch, PageResult};

/// A blog post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub url: String,
    pub preview_url: String,
    pub body: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub is_published: bool,
    /// `{date, timezone_type, timezone}` as sent by the v2 API.
    pub published_date: serde_json::Value,
    pub published_date_iso8601: String,
    #[serde(deserialize_with = "nullable")]
    pub meta_description: String,
    #[serde(deserialize_with = "nullable")]
    pub meta_keywords: String,
    #[serde(deserialize_with = "nullable")]
    pub author: String,
    #[serde(deserialize_with = "nullable")]
    pub thumbnail_path: String,
}

const POSTS: &str = "v2/blog/posts";

impl Client {
    /// Get one page of blog posts.
    ///
    /// The v2 API reports no page count; an empty page (or 204) ends the
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    #[instrument(skip(self))]
    pub async fn get_posts(&self, page: u32) -> Result<PageResult<Post>, BigCommerceError> {
        self.get_v2_page(POSTS, &[], page).await
    }

    /// Get every blog post.
    ///
    /// # Errors
    ///
    /// Returns [`IncompleteFetch`] with the posts fetched so far.
    #[instrument(skip(self))]
    pub async fn get_all_posts(&self) -> Result<Vec<Post>, IncompleteFetch<Post, BigCommerceError>> {
        self.get_all_v2(POSTS, &[]).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_post_decodes() {
        let body = r#"[{
            "id": 3, "title": "Spring lookbook", "url": "/blog/spring-lookbook/",
            "body": "<p>Hello</p>", "tags": ["spring"], "is_published": true,
            "published_date": {"timezone_type": 1, "date": "2024-03-01 10:00:00.000000", "timezone": "+00:00"},
            "published_date_iso8601": "2024-03-01T10:00:00+00:00",
            "meta_keywords": null, "author": null, "thumbnail_path": "/thumb.jpg"
        }]"#;
        let posts: Vec<Post> = serde_json::from_str(body).unwrap();
        assert_eq!(posts[0].tags, vec!["spring"]);
        assert_eq!(posts[0].author, "");
        assert_eq!(posts[0].published_date["timezone_type"], 1);
    }
}
