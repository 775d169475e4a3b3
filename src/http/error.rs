//! Error-to-response mapping for the route layer.
//!
//! Authorization failures redirect to the login entry without a message;
//! everything else reports a JSON `{"error": ...}` body with the status the
//! failure class calls for.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;
use crate::dashboard::{AddExpenseError, ValidationError};
use crate::model::CriteriaError;
use crate::store::StoreError;

use super::LOGIN_PATH;

#[derive(Debug)]
pub enum ApiError {
    /// Role or session failure on a guarded route: silent redirect.
    LoginRedirect,
    /// Bad login credentials: reported, no session established.
    Auth(AuthError),
    /// Add-expense form failure: reported, nothing written.
    Validation(ValidationError),
    /// Out-of-range filter criteria.
    Criteria(CriteriaError),
    /// Receipt payload that is not valid base64.
    InvalidReceipt,
    /// Store insert failure; no recovery defined, surfaces as a fault.
    Store(StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::LoginRedirect => Redirect::to(LOGIN_PATH).into_response(),
            ApiError::Auth(e) => reply(StatusCode::UNAUTHORIZED, e.to_string()),
            ApiError::Validation(e) => reply(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Criteria(e) => reply(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::InvalidReceipt => reply(
                StatusCode::UNPROCESSABLE_ENTITY,
                "receipt must be base64-encoded".to_owned(),
            ),
            ApiError::Store(e) => {
                error!(error = %e, "request failed against the expense store");
                reply(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

fn reply(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<CriteriaError> for ApiError {
    fn from(e: CriteriaError) -> Self {
        ApiError::Criteria(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<AddExpenseError> for ApiError {
    fn from(e: AddExpenseError) -> Self {
        match e {
            AddExpenseError::Validation(v) => ApiError::Validation(v),
            AddExpenseError::Store(s) => ApiError::Store(s),
        }
    }
}
