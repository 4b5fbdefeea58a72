//! API request handlers
//!
//! Handlers for all REST API endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RevueError;
use crate::session::{load_workbook, Session};

use super::server::AppState;

/// File name assumed when the caller does not send one
pub const DEFAULT_UPLOAD_NAME: &str = "workbook.xlsx";

/// RFC 5987 `attr-char` keeps alphanumerics plus these marks unescaped
const FILENAME_ATTR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Revue API Server".to_string(),
        version: state.version.clone(),
        description: "Analytical review of account balances across two periods".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/v1/sheets",
                "POST",
                "List the sheets of an uploaded workbook",
            ),
            EndpointInfo::new(
                "/api/v1/report",
                "POST",
                "Generate the 'Revue analytique' workbook (?current=&prior=&file_name=)",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["sheets".to_string(), "report".to_string()],
    }))
}

/// Sheets response
#[derive(Serialize, Default)]
pub struct SheetsResponse {
    pub sheet_names: Vec<String>,
}

/// POST /api/v1/sheets - List the sheets of the uploaded workbook
pub async fn sheets(body: Bytes) -> Response {
    match load_workbook(&body) {
        Ok(loaded) => Json(ApiResponse::ok(SheetsResponse {
            sheet_names: loaded.sheet_names,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to list sheets");
            error_response(&e)
        }
    }
}

/// Report query parameters
#[derive(Deserialize, Default)]
pub struct ReportParams {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub prior: String,
    pub file_name: Option<String>,
}

/// POST /api/v1/report - Generate the report workbook from the uploaded bytes
pub async fn report(Query(params): Query<ReportParams>, body: Bytes) -> Response {
    let mut session = Session::new();

    if !body.is_empty() {
        let file_name = params
            .file_name
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());
        if let Err(e) = session.load(file_name, &body) {
            return error_response(&e);
        }
    }
    session.select_current(params.current);
    session.select_prior(params.prior);

    match session.generate() {
        Ok(report) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, report.mime_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    content_disposition(&report.file_name),
                ),
                (
                    header::HeaderName::from_static("x-request-id"),
                    Uuid::new_v4().to_string(),
                ),
            ],
            report.bytes,
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Map the error taxonomy onto a status code and a user-safe message
pub fn error_response(err: &RevueError) -> Response {
    let status = match err {
        RevueError::MissingInput(_) => StatusCode::BAD_REQUEST,
        RevueError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::<()>::err(err.user_message()))).into_response()
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(file_name, FILENAME_ATTR)
    )
}
