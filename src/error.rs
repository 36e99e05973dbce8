use axum::{
    extract::rejection::{FormRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::dataset::PanelBrand;

/// Problems with the reference tables, raised while loading them or when the
/// engine needs a record that is not there.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}:{line}: expected {expected} fields, found {found}")]
    FieldCount {
        source_name: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{source_name}:{line}: invalid {field} value {value:?}")]
    InvalidNumber {
        source_name: String,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("{source_name}:{line}: {field} must not be negative, got {value}")]
    Negative {
        source_name: String,
        line: usize,
        field: &'static str,
        value: f64,
    },

    #[error("{source_name}:{line}: city {city:?} lists no companies")]
    NoCompanies {
        source_name: String,
        line: usize,
        city: String,
    },

    #[error("{source_name}:{line}: duplicate city {city:?}")]
    DuplicateCity {
        source_name: String,
        line: usize,
        city: String,
    },

    #[error("panel table has no entry for {0}")]
    MissingPanel(PanelBrand),

    #[error("city table is empty")]
    NoCities,

    #[error("dataset reload task failed: {0}")]
    ReloadTask(#[from] tokio::task::JoinError),
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("number entered for {field} was invalid")]
    InvalidNumber { field: &'static str },

    #[error("no value entered for {field}")]
    MissingField { field: &'static str },

    #[error("number entered for {field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("city {0:?} not found")]
    UnknownCity(String),

    /// The query string or form body could not be extracted at all.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidNumber { .. }
            | ApiError::MissingField { .. }
            | ApiError::NotPositive { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnknownCity(_) => StatusCode::NOT_FOUND,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("[API] {}", self);
        } else {
            tracing::debug!("[API] rejected request: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
