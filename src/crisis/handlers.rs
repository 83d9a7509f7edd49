use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CrisisOverview, InterventionRequest, InterventionResponse, UpdateCrisisRequest},
    protocol::{
        all_protocols, dispatch, protocol_for, protocol_name, NotifiedContact,
        NotifiedProfessional, EMERGENCY_RESOURCES,
    },
    repo::{self, NewReport},
    repo_types::CrisisReport,
};
use crate::{
    auth::extractors::AuthUser,
    contacts,
    error::{ApiError, ApiResult},
    professionals, sessions,
    state::AppState,
    users::{self, repo_types::Role},
};

pub const CONTACTS_TO_NOTIFY: i64 = 3;
pub const PROFESSIONALS_TO_NOTIFY: i64 = 5;

pub fn crisis_routes() -> Router<AppState> {
    Router::new()
        .route("/crisis/intervention", get(overview).post(intervene))
        .route("/crisis/:id", patch(update_status))
}

#[instrument(skip(state, body))]
pub async fn intervene(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<InterventionRequest>,
) -> ApiResult<Json<InterventionResponse>> {
    let description = body.description.trim();
    if description.is_empty() {
        return Err(ApiError::bad_request("Description is required"));
    }
    if let Some(session_id) = body.session_id {
        sessions::repo::find_by_id(&state.db, session_id)
            .await?
            .filter(|s| s.is_participant(caller.id))
            .ok_or_else(|| ApiError::not_found("Session not found"))?;
    }

    let protocol_used = protocol_name(body.severity);
    let report = repo::insert(
        &state.db,
        &NewReport {
            user_id: caller.id,
            session_id: body.session_id,
            severity: body.severity,
            crisis_type: body.crisis_type,
            description,
            protocol_used: &protocol_used,
        },
    )
    .await?;

    let contacts: Vec<NotifiedContact> =
        contacts::repo::list_active(&state.db, caller.id, Some(CONTACTS_TO_NOTIFY))
            .await?
            .iter()
            .map(NotifiedContact::from)
            .collect();
    let professionals: Vec<NotifiedProfessional> =
        professionals::repo::list_active(&state.db, None, None, PROFESSIONALS_TO_NOTIFY)
            .await?
            .iter()
            .map(NotifiedProfessional::from)
            .collect();

    let actions_taken = dispatch(
        body.severity,
        &contacts,
        &professionals,
        OffsetDateTime::now_utc(),
    );
    let metadata = json!({
        "actionsTaken": actions_taken,
        "protocolSteps": protocol_for(body.severity),
        "emergencyContactsNotified": contacts.len(),
        "professionalsNotified": professionals.len(),
    });
    repo::set_metadata(&state.db, report.id, &metadata).await?;

    if body.severity.escalates() {
        warn!(
            report_id = %report.id,
            user_id = %caller.id,
            severity = body.severity.as_str(),
            crisis_type = ?body.crisis_type,
            contacts = contacts.len(),
            professionals = professionals.len(),
            "crisis protocol activated"
        );
    } else {
        info!(
            report_id = %report.id,
            severity = body.severity.as_str(),
            "crisis protocol activated"
        );
    }

    Ok(Json(InterventionResponse {
        success: true,
        crisis_report: CrisisReport {
            metadata: Some(metadata),
            ..report
        },
        protocol_activated: protocol_used,
        actions_taken,
        emergency_resources: EMERGENCY_RESOURCES,
        emergency_contacts: contacts,
        professional_support: professionals,
    }))
}

#[instrument(skip(state))]
pub async fn overview(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<CrisisOverview>> {
    let active_crises = repo::list_open(&state.db, caller.id).await?;
    Ok(Json(CrisisOverview {
        active_crises,
        available_protocols: all_protocols(),
        emergency_resources: EMERGENCY_RESOURCES,
    }))
}

#[instrument(skip(state, body))]
pub async fn update_status(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCrisisRequest>,
) -> ApiResult<Json<CrisisReport>> {
    let report = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Crisis report not found"))?;

    if report.user_id != caller.id {
        let is_admin = users::repo::find_by_id(&state.db, caller.id)
            .await?
            .is_some_and(|u| u.role == Role::Admin && !u.is_disabled);
        if !is_admin {
            return Err(ApiError::not_found("Crisis report not found"));
        }
    }

    let updated = repo::set_status(&state.db, id, body.status).await?;
    info!(report_id = %id, by = %caller.id, status = ?updated.status, "crisis status changed");
    Ok(Json(updated))
}
