use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreatePostRequest, ForumQuery, PostListResponse, PostResponse, UpdatePostRequest},
    repo::{self, NewPost, PostFilter},
    repo_types::ForumCategory,
    services::{normalize_tags, word_count, PostView, SortOrder},
};
use crate::{
    auth::extractors::AuthUser,
    discover::services::non_blank,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn forum_routes() -> Router<AppState> {
    Router::new()
        .route("/forums/posts", get(list_posts).post(create_post))
        .route("/forums/posts/:id", put(update_post).delete(delete_post))
}

#[instrument(skip(state, body))]
pub async fn create_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<CreatePostRequest>,
) -> ApiResult<Json<PostResponse>> {
    let title = body.title.trim();
    let content = body.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(ApiError::bad_request("Title and content are required"));
    }
    let category: ForumCategory = body
        .category
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid forum category"))?;

    let tags = normalize_tags(body.tags);
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(anyhow::Error::from)?;
    let row = repo::insert(
        &state.db,
        &NewPost {
            author_id: caller.id,
            title,
            content,
            category,
            is_anonymous: body.is_anonymous.unwrap_or(true),
            tags: &tags,
            metadata: json!({
                "wordCount": word_count(content),
                "lastActivity": now,
            }),
        },
    )
    .await?;

    info!(post_id = %row.id, category = category.as_str(), "forum post created");
    Ok(Json(PostResponse {
        success: true,
        post: PostView::new(row, false),
    }))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(q): Query<ForumQuery>,
) -> ApiResult<Json<PostListResponse>> {
    let category = match q.category.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<ForumCategory>()
                .map_err(|_| ApiError::bad_request("Invalid forum category"))?,
        ),
    };
    let paging = q.paging();
    let search = non_blank(q.search.clone());
    let filter = PostFilter {
        category,
        search: search.as_deref(),
        tag: q.first_tag(),
    };

    let (rows, total) = repo::list(
        &state.db,
        &filter,
        SortOrder::parse(q.sort_by.as_deref()),
        paging.limit(),
        paging.offset(),
    )
    .await?;

    Ok(Json(PostListResponse {
        posts: rows.into_iter().map(|r| PostView::new(r, true)).collect(),
        pagination: paging.meta(total),
    }))
}

#[instrument(skip(state, body))]
pub async fn update_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePostRequest>,
) -> ApiResult<Json<PostResponse>> {
    let existing = repo::find_live(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    if existing.author_id != caller.id {
        return Err(ApiError::forbidden("Only the author can edit this post"));
    }

    let title = body.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let content = body.content.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let tags = body.tags.map(normalize_tags);
    let row = repo::update(&state.db, id, title, content, body.is_anonymous, tags.as_deref()).await?;

    info!(post_id = %id, "forum post updated");
    Ok(Json(PostResponse {
        success: true,
        post: PostView::new(row, false),
    }))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let existing = repo::find_live(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    if existing.author_id != caller.id {
        return Err(ApiError::forbidden("Only the author can delete this post"));
    }

    repo::soft_delete(&state.db, id).await?;
    info!(post_id = %id, "forum post deleted");
    Ok(Json(json!({ "success": true, "message": "Post deleted successfully" })))
}
