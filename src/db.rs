use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("connect to database")
}

/// `%needle%` for ILIKE, with LIKE wildcards in the needle escaped.
pub fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// `?page=&limit=` query parameters, 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    20
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    pub const MAX_LIMIT: i64 = 100;
    pub const MAX_PAGE: i64 = 10_000;

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, Self::MAX_LIMIT)
    }

    pub fn page(&self) -> i64 {
        self.page.clamp(1, Self::MAX_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let limit = self.limit();
        PageMeta {
            page: self.page(),
            limit,
            total,
            total_pages: total.max(0).saturating_add(limit - 1) / limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("delhi"), "%delhi%");
        assert_eq!(like_pattern(" 50%_off "), "%50\\%\\_off%");
    }

    #[test]
    fn pagination_math() {
        let q = PageQuery { page: 3, limit: 10 };
        assert_eq!(q.offset(), 20);
        assert_eq!(
            q.meta(21),
            PageMeta {
                page: 3,
                limit: 10,
                total: 21,
                total_pages: 3
            }
        );
        assert_eq!(q.meta(0).total_pages, 0);
    }

    #[test]
    fn pagination_clamps_bad_input() {
        let q = PageQuery { page: 0, limit: 10_000 };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), PageQuery::MAX_LIMIT);
        assert_eq!(q.offset(), 0);

        let q = PageQuery { page: 2, limit: -5 };
        assert_eq!(q.limit(), 1);
    }

    #[test]
    fn huge_page_numbers_stay_in_range() {
        let q = PageQuery {
            page: i64::MAX,
            limit: i64::MAX,
        };
        assert_eq!(q.page(), PageQuery::MAX_PAGE);
        assert_eq!(q.offset(), (PageQuery::MAX_PAGE - 1) * PageQuery::MAX_LIMIT);

        let q = PageQuery {
            page: i64::MIN,
            limit: i64::MIN,
        };
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn page_count_survives_extreme_totals() {
        let q = PageQuery { page: 1, limit: 100 };
        assert_eq!(q.meta(i64::MAX).total_pages, i64::MAX / 100);
        assert_eq!(q.meta(-3).total_pages, 0);
    }
}
