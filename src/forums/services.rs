use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{ForumCategory, ForumPostRow};

pub const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Latest,
    Popular,
    MostReplies,
    Pinned,
}

impl SortOrder {
    /// Unknown values fall back to [`SortOrder::Latest`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("popular") => SortOrder::Popular,
            Some("most_replies") => SortOrder::MostReplies,
            Some("pinned") => SortOrder::Pinned,
            _ => SortOrder::Latest,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            SortOrder::Latest => "p.created_at DESC",
            SortOrder::Popular => "p.like_count DESC, p.reply_count DESC, p.created_at DESC",
            SortOrder::MostReplies => "p.reply_count DESC, p.created_at DESC",
            SortOrder::Pinned => "p.is_pinned DESC, p.created_at DESC",
        }
    }
}

/// First [`EXCERPT_CHARS`] characters, with `...` when anything was cut.
pub fn excerpt(content: &str) -> String {
    match content.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Trimmed, non-empty, first occurrence wins.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: ForumCategory,
    pub is_anonymous: bool,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub author: Option<PostAuthor>,
    pub reply_count: i32,
    pub view_count: i32,
    pub like_count: i32,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PostView {
    /// Public shape of a post; anonymous posts never reveal the author.
    pub fn new(row: ForumPostRow, summarize: bool) -> Self {
        let author = (!row.is_anonymous).then(|| PostAuthor {
            id: row.author_id,
            name: row.author_name,
            avatar: row.author_avatar,
        });
        Self {
            id: row.id,
            title: row.title,
            content: if summarize {
                excerpt(&row.content)
            } else {
                row.content
            },
            category: row.category,
            is_anonymous: row.is_anonymous,
            is_pinned: row.is_pinned,
            is_locked: row.is_locked,
            author,
            reply_count: row.reply_count,
            view_count: row.view_count,
            like_count: row.like_count,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(content: &str, is_anonymous: bool) -> ForumPostRow {
        ForumPostRow {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "Morning walks".into(),
            content: content.into(),
            category: ForumCategory::SelfCare,
            is_anonymous,
            is_pinned: false,
            is_locked: false,
            tags: vec!["routine".into()],
            reply_count: 0,
            view_count: 0,
            like_count: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            author_name: Some("Ravi".into()),
            author_avatar: None,
        }
    }

    #[test]
    fn short_content_is_untouched() {
        let text = "a".repeat(EXCERPT_CHARS);
        assert_eq!(excerpt(&text), text);
    }

    #[test]
    fn long_content_is_cut_at_200_chars() {
        let text = "b".repeat(EXCERPT_CHARS + 1);
        let out = excerpt(&text);
        assert_eq!(out.len(), EXCERPT_CHARS + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let text = "है".repeat(250);
        let out = excerpt(&text);
        assert_eq!(out.chars().count(), EXCERPT_CHARS + 3);
    }

    #[test]
    fn anonymous_posts_hide_the_author() {
        assert!(PostView::new(row("hi", true), true).author.is_none());
        let named = PostView::new(row("hi", false), true);
        assert_eq!(named.author.and_then(|a| a.name), Some("Ravi".into()));
    }

    #[test]
    fn full_view_keeps_whole_content() {
        let text = "c".repeat(500);
        assert_eq!(PostView::new(row(&text, true), false).content, text);
    }

    #[test]
    fn parses_sort_with_latest_fallback() {
        assert_eq!(SortOrder::parse(Some("popular")), SortOrder::Popular);
        assert_eq!(SortOrder::parse(Some("most_replies")), SortOrder::MostReplies);
        assert_eq!(SortOrder::parse(Some("pinned")), SortOrder::Pinned);
        assert_eq!(SortOrder::parse(Some("oldest")), SortOrder::Latest);
        assert_eq!(SortOrder::parse(None), SortOrder::Latest);
    }

    #[test]
    fn counts_words_and_cleans_tags() {
        assert_eq!(word_count("  one two\nthree  "), 3);
        assert_eq!(
            normalize_tags(vec![" Calm ".into(), "".into(), "calm".into(), "sleep".into()]),
            vec!["Calm".to_string(), "sleep".to_string()]
        );
    }

    #[test]
    fn category_parsing_is_case_insensitive() {
        assert_eq!("self_care".parse(), Ok(ForumCategory::SelfCare));
        assert!("cooking".parse::<ForumCategory>().is_err());
    }
}
