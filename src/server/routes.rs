//! JSON API handlers.

use super::AppState;
use crate::core::{auth::AuthLogic, create::CreateLogic, period};
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::entry::{EntrySummary, TimesheetEntry};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Success envelope: `{success: true, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListParams {
    pub month: Option<String>,
    pub year: Option<String>,
}

impl ListParams {
    /// First occurrence wins when a key is repeated.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "month" => &mut params.month,
                "year" => &mut params.year,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// POST /api/login
pub async fn login(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    // configuration is checked before the request body is looked at
    let Some(configured) = state.config.hashed_password.as_deref() else {
        return Err(AppError::ServerMisconfigured(
            "HASHED_PASSWORD is not configured".into(),
        ));
    };

    let password = AuthLogic::password_from_body(&body)?;
    AuthLogic::check(Some(configured), &password)?;

    let session = state.sealer.login_session(Utc::now())?;
    let token = state.sealer.seal(&session)?;
    info!("Login succeeded, session issued");

    Ok((
        [(SET_COOKIE, state.sealer.set_cookie(&token))],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response())
}

/// GET /api/timesheet?month=YYYY-MM | ?year=YYYY
pub async fn list_entries(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<EntrySummary>>>> {
    let Query(pairs) = params.map_err(|e| AppError::bad_request(e.body_text()))?;
    let params = ListParams::from_pairs(pairs);
    let filter = period::resolve_filter(params.month.as_deref(), params.year.as_deref())?;
    let range = filter.map(|p| p.range());

    if let (Some(p), Some(r)) = (&filter, &range) {
        info!(period = %p, start = %r.start, end = %r.end, "Filtering timesheet entries");
    }

    let entries = state
        .db
        .with_conn(move |conn| queries::list_entries(conn, range.as_ref()))
        .await?;

    Ok(Json(ApiResponse::ok(
        entries.into_iter().map(EntrySummary::from).collect(),
    )))
}

/// POST /api/timesheet
pub async fn create_entry(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ApiResponse<TimesheetEntry>>)> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("Malformed JSON body: {e}")))?;

    let data = CreateLogic::entry_from_payload(&payload)?;

    let entry = state
        .db
        .with_conn(move |conn| queries::insert_entry(conn, data))
        .await?;

    info!(id = %entry.id, date = %entry.data.date, "Timesheet entry created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}
