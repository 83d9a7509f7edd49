use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        CreateSettingRequest, CreateUserRequest, DashboardResponse, ModerateRequest,
        ModerationList, ModerationQuery, Overview, SettingsQuery, SettingsResponse,
        UpdateSettingRequest, UserActionRequest, UserList, UserQuery,
    },
    repo::{self, Decision, NewSetting, UserFilter},
    repo_types::{ContentType, ModerationItem, SessionStat, SystemSetting},
    services::{group_settings, ModerationAction, UserAction},
};
use crate::{
    auth::{
        extractors::AdminUser,
        handlers::{is_valid_email, normalize_email},
        password::{hash_password, is_strong_enough},
    },
    crisis,
    discover::services::non_blank,
    error::{ApiError, ApiResult},
    forums, sessions,
    state::AppState,
    users::{self, repo_types::User},
    wallet,
};

const RECENT_LOGS: i64 = 10;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/:id", put(update_user))
        .route("/admin/settings", get(list_settings).post(create_setting))
        .route("/admin/settings/:id", put(update_setting))
        .route("/admin/content", get(list_content).post(moderate_content))
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<DashboardResponse>> {
    let counts = repo::counts(&state.db).await?;
    let total_revenue = wallet::repo::completed_revenue(&state.db).await?;
    let active_crisis_reports = crisis::repo::count_open(&state.db).await?;
    let session_stats = sessions::repo::count_by_status(&state.db)
        .await?
        .into_iter()
        .map(|(status, count)| SessionStat { status, count })
        .collect();
    let recent_logs = repo::recent_system_logs(&state.db, RECENT_LOGS).await?;

    Ok(Json(DashboardResponse {
        overview: Overview {
            counts,
            total_revenue,
            active_crisis_reports,
        },
        session_stats,
        recent_logs,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(q): Query<UserQuery>,
) -> ApiResult<Json<UserList>> {
    let paging = q.paging();
    let search = non_blank(q.search.clone());
    let filter = UserFilter {
        search: search.as_deref(),
        role: q.role,
        available: q.available(),
    };
    let (users, total) =
        repo::list_users(&state.db, &filter, paging.limit(), paging.offset()).await?;
    Ok(Json(UserList {
        users,
        pagination: paging.meta(total),
    }))
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    admin.require_admin()?;

    let email = normalize_email(&body.email);
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email"));
    }
    if !is_strong_enough(&body.password) {
        return Err(ApiError::bad_request("Password too short"));
    }
    if matches!(body.hourly_rate, Some(r) if r < 0) {
        return Err(ApiError::bad_request("hourlyRate must not be negative"));
    }
    if users::repo::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::conflict("User with this email already exists"));
    }

    let hash = hash_password(&body.password)?;
    let user = users::repo::create(
        &state.db,
        &email,
        &hash,
        body.name.as_deref(),
        body.role,
        body.hourly_rate,
    )
    .await?;

    repo::log_admin_action(
        &state.db,
        admin.id,
        "USER_VERIFICATION",
        "user",
        Some(user.id),
        &format!("Created user {}", user.email),
        json!({ "role": user.role, "performedBy": admin.email }),
    )
    .await?;

    info!(user_id = %user.id, role = ?user.role, "user created by admin");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UserActionRequest>,
) -> ApiResult<Json<User>> {
    admin.require_admin()?;
    if id == admin.id && body.action.locks_out() {
        return Err(ApiError::bad_request("Cannot apply this action to yourself"));
    }

    let user = match body.action {
        UserAction::Update => {
            let changes = body
                .data
                .as_ref()
                .ok_or_else(|| ApiError::bad_request("Update data is required"))?;
            changes.validate().map_err(ApiError::bad_request)?;
            users::repo::update_profile(&state.db, id, changes).await?
        }
        action => {
            let flags = action.flags();
            users::repo::set_flags(&state.db, id, flags.is_available, flags.is_disabled).await?
        }
    }
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    let action_type = body.action.action_type();
    repo::log_admin_action(
        &state.db,
        admin.id,
        action_type,
        "user",
        Some(user.id),
        &format!("{action_type} applied to {}", user.email),
        json!({ "action": body.action, "performedBy": admin.email }),
    )
    .await?;

    warn!(user_id = %user.id, action = ?body.action, admin_id = %admin.id, "user account changed");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn list_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(q): Query<SettingsQuery>,
) -> ApiResult<Json<SettingsResponse>> {
    let category = non_blank(q.category);
    let flat = repo::list_settings(&state.db, category.as_deref()).await?;
    Ok(Json(SettingsResponse {
        settings: group_settings(&flat),
        flat,
    }))
}

#[instrument(skip(state, body))]
pub async fn create_setting(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<CreateSettingRequest>,
) -> ApiResult<(StatusCode, Json<SystemSetting>)> {
    admin.require_admin()?;
    body.validate().map_err(ApiError::bad_request)?;

    let new = NewSetting {
        key: body.key.trim(),
        value: &body.value,
        description: body.description.as_deref(),
        category: body.category.trim(),
        is_public: body.is_public,
        updated_by: admin.id,
    };
    let setting = repo::insert_setting(&state.db, &new)
        .await?
        .ok_or_else(|| ApiError::conflict("Setting with this key already exists"))?;

    repo::log_admin_action(
        &state.db,
        admin.id,
        "SYSTEM_SETTING_UPDATE",
        "setting",
        Some(setting.id),
        &format!("Created setting {}", setting.key),
        json!({
            "key": setting.key,
            "value": setting.value,
            "category": setting.category,
            "performedBy": admin.email,
        }),
    )
    .await?;

    info!(key = %setting.key, "setting created");
    Ok((StatusCode::CREATED, Json(setting)))
}

#[instrument(skip(state, body))]
pub async fn update_setting(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSettingRequest>,
) -> ApiResult<Json<SystemSetting>> {
    admin.require_admin()?;
    if body.value.is_null() {
        return Err(ApiError::bad_request("Value is required"));
    }

    let setting = repo::update_setting(
        &state.db,
        id,
        &body.value,
        body.description.as_deref(),
        body.is_public,
        admin.id,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Setting not found"))?;

    repo::log_admin_action(
        &state.db,
        admin.id,
        "SYSTEM_SETTING_UPDATE",
        "setting",
        Some(setting.id),
        &format!("Updated setting {}", setting.key),
        json!({ "key": setting.key, "value": setting.value, "performedBy": admin.email }),
    )
    .await?;

    info!(key = %setting.key, "setting updated");
    Ok(Json(setting))
}

#[instrument(skip(state))]
pub async fn list_content(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(q): Query<ModerationQuery>,
) -> ApiResult<Json<ModerationList>> {
    let paging = q.paging();
    let (items, total) = repo::list_moderation(
        &state.db,
        q.status,
        q.content_type,
        paging.limit(),
        paging.offset(),
    )
    .await?;
    Ok(Json(ModerationList {
        items,
        pagination: paging.meta(total),
    }))
}

/// Moderators may decide on content; rejecting a forum post also hides it.
#[instrument(skip(state, body))]
pub async fn moderate_content(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<ModerateRequest>,
) -> ApiResult<Json<ModerationItem>> {
    let decision = Decision {
        content_type: body.content_type,
        content_id: body.content_id,
        status: body.action.status(),
        moderator_id: admin.id,
        reason: body.reason.as_deref(),
        admin_notes: body.admin_notes.as_deref(),
    };
    let item = repo::upsert_decision(&state.db, &decision).await?;

    if body.action == ModerationAction::Reject {
        match body.content_type {
            ContentType::ForumPost => {
                if !forums::repo::soft_delete(&state.db, body.content_id).await? {
                    warn!(post_id = %body.content_id, "rejected post already removed");
                }
            }
        }
    }

    repo::log_admin_action(
        &state.db,
        admin.id,
        body.action.action_type(),
        "forum_post",
        Some(body.content_id),
        &format!("{:?} forum post {}", body.action, body.content_id),
        json!({
            "action": body.action,
            "reason": body.reason,
            "adminNotes": body.admin_notes,
            "performedBy": admin.email,
        }),
    )
    .await?;

    info!(content_id = %body.content_id, action = ?body.action, "content moderated");
    Ok(Json(item))
}
