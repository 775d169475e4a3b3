//! Route handlers and their wire DTOs. Bodies are JSON with camelCase
//! fields; the add-expense payload mirrors the dashboard form, so its
//! fields arrive as strings and presence is validated by the view-model.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::dashboard::{DashboardView, ExpenseDraft};
use crate::image::ReceiptUpload;
use crate::model::{ExpenseId, FilterCriteria, Role, Tenant, TenantTotals};
use crate::session::SessionToken;

use super::error::ApiError;
use super::guard::CurrentSession;
use super::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginResponse {
    token: SessionToken,
    role: Role,
    expires_at: OffsetDateTime,
}

/// Redirect target for guarded routes; points clients at the login call.
pub(super) async fn login_entry() -> Json<serde_json::Value> {
    Json(json!({
        "message": "authentication required",
        "login": "POST /login",
    }))
}

pub(super) async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let role = state.auth().verify(&request.username, &request.password)?;
    let session = state.sessions().login(role);
    Ok(Json(LoginResponse {
        token: session.token,
        role: session.role,
        expires_at: session.expires_at,
    }))
}

pub(super) async fn logout(State(state): State<AppState>, session: CurrentSession) -> StatusCode {
    state.logout(session.token());
    StatusCode::NO_CONTENT
}

pub(super) async fn college_dashboard(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(tenant): Path<Tenant>,
) -> Result<Json<DashboardView>, ApiError> {
    session.require_college(tenant)?;
    let dashboard = state
        .views()
        .dashboard(session.token(), tenant, state.store(), state.images());
    Ok(Json(dashboard.view()))
}

pub(super) async fn college_filter(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(tenant): Path<Tenant>,
    Json(criteria): Json<FilterCriteria>,
) -> Result<Json<DashboardView>, ApiError> {
    session.require_college(tenant)?;
    let dashboard = state
        .views()
        .dashboard(session.token(), tenant, state.store(), state.images());
    Ok(Json(dashboard.apply_filter(criteria)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddExpenseRequest {
    #[serde(default)]
    description: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    receipt: Option<ReceiptPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReceiptPayload {
    file_name: String,
    content_base64: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AddExpenseResponse {
    id: ExpenseId,
}

pub(super) async fn college_add_expense(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(tenant): Path<Tenant>,
    Json(request): Json<AddExpenseRequest>,
) -> Result<(StatusCode, Json<AddExpenseResponse>), ApiError> {
    session.require_college(tenant)?;
    let AddExpenseRequest {
        description,
        amount,
        date,
        receipt,
    } = request;
    let receipt = decode_receipt(receipt)?;
    let dashboard = state
        .views()
        .dashboard(session.token(), tenant, state.store(), state.images());
    dashboard.edit_draft(|draft| {
        *draft = ExpenseDraft {
            description,
            amount,
            date,
            receipt,
        };
    });
    let id = dashboard.submit_draft().await?;
    Ok((StatusCode::CREATED, Json(AddExpenseResponse { id })))
}

fn decode_receipt(payload: Option<ReceiptPayload>) -> Result<Option<ReceiptUpload>, ApiError> {
    match payload {
        None => Ok(None),
        Some(payload) => {
            let bytes = BASE64
                .decode(payload.content_base64.as_bytes())
                .map_err(|_| ApiError::InvalidReceipt)?;
            Ok(Some(ReceiptUpload {
                file_name: payload.file_name,
                bytes,
            }))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AdminSummary {
    colleges: Vec<CollegeTotal>,
    grand_total: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CollegeTotal {
    tenant: Tenant,
    total: f64,
    /// Navigation target for this tenant's itemized detail view.
    detail: String,
}

impl AdminSummary {
    fn from_totals(totals: &TenantTotals) -> Self {
        let colleges = totals
            .iter()
            .map(|(tenant, total)| CollegeTotal {
                tenant,
                total,
                detail: format!("/admin/colleges/{tenant}"),
            })
            .collect();
        Self {
            colleges,
            grand_total: totals.grand_total(),
        }
    }
}

pub(super) async fn admin_summary(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<AdminSummary>, ApiError> {
    session.require_admin()?;
    let rollup = state.views().rollup(session.token(), state.store());
    Ok(Json(AdminSummary::from_totals(&rollup.totals())))
}

pub(super) async fn admin_college_detail(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(tenant): Path<Tenant>,
) -> Result<Json<DashboardView>, ApiError> {
    session.require_admin()?;
    let dashboard = state
        .views()
        .admin_detail(session.token(), tenant, state.store(), state.images());
    Ok(Json(dashboard.view()))
}

pub(super) async fn admin_college_filter(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(tenant): Path<Tenant>,
    Json(criteria): Json<FilterCriteria>,
) -> Result<Json<DashboardView>, ApiError> {
    session.require_admin()?;
    let dashboard = state
        .views()
        .admin_detail(session.token(), tenant, state.store(), state.images());
    Ok(Json(dashboard.apply_filter(criteria)?))
}
