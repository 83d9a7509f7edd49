use serde::{Deserialize, Serialize};

use super::services::PostView;
use crate::db::{PageMeta, PageQuery};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_anonymous: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    pub search: Option<String>,
    /// Comma separated; the first tag filters.
    pub tags: Option<String>,
    pub sort_by: Option<String>,
}

impl ForumQuery {
    pub fn paging(&self) -> PageQuery {
        PageQuery {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn first_tag(&self) -> Option<&str> {
        self.tags
            .as_deref()
            .and_then(|t| t.split(',').map(str::trim).find(|t| !t.is_empty()))
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: PostView,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostView>,
    pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_tag_wins() {
        let q = ForumQuery {
            tags: Some(" , sleep,calm".into()),
            ..Default::default()
        };
        assert_eq!(q.first_tag(), Some("sleep"));
        assert_eq!(ForumQuery::default().first_tag(), None);
    }

    #[test]
    fn defaults_to_ten_per_page() {
        let p = ForumQuery::default().paging();
        assert_eq!((p.page(), p.limit()), (1, 10));
    }
}
