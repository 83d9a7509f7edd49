use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForumCategory {
    General,
    Anxiety,
    Depression,
    Relationships,
    Trauma,
    Recovery,
    SelfCare,
    Mindfulness,
    SuccessStories,
}

impl ForumCategory {
    pub const ALL: [ForumCategory; 9] = [
        ForumCategory::General,
        ForumCategory::Anxiety,
        ForumCategory::Depression,
        ForumCategory::Relationships,
        ForumCategory::Trauma,
        ForumCategory::Recovery,
        ForumCategory::SelfCare,
        ForumCategory::Mindfulness,
        ForumCategory::SuccessStories,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ForumCategory::General => "GENERAL",
            ForumCategory::Anxiety => "ANXIETY",
            ForumCategory::Depression => "DEPRESSION",
            ForumCategory::Relationships => "RELATIONSHIPS",
            ForumCategory::Trauma => "TRAUMA",
            ForumCategory::Recovery => "RECOVERY",
            ForumCategory::SelfCare => "SELF_CARE",
            ForumCategory::Mindfulness => "MINDFULNESS",
            ForumCategory::SuccessStories => "SUCCESS_STORIES",
        }
    }
}

impl FromStr for ForumCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Post joined with its author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct ForumPostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: ForumCategory,
    pub is_anonymous: bool,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub tags: Vec<String>,
    pub reply_count: i32,
    pub view_count: i32,
    pub like_count: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
}
