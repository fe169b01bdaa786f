use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::eoq::{EoqError, EoqParams};
use crate::export::{ExportError, CLEANED_EXPORT_FILENAME, CSV_CONTENT_TYPE};
use crate::importers::ImportError;
use crate::normalizer::CleanedTable;
use crate::services::{EoqOutput, InventoryReport, InventoryService, ServiceError};

#[derive(Clone)]
pub struct AppState {
    pub inventory_service: InventoryService,
    pub default_params: EoqParams,
    pub max_upload_bytes: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response for a cleaned upload; `eoq` and `eoq_error` are mutually exclusive
#[derive(Serialize)]
pub struct CleanResponse {
    pub filename: String,
    pub original_columns: Vec<String>,
    pub cleaned: CleanedTable,
    pub warnings: Vec<String>,
    pub ordering_cost: f64,
    pub holding_rate_pct: f64,
    pub eoq: Option<EoqOutput>,
    pub eoq_error: Option<String>,
}

impl CleanResponse {
    fn from_report(report: InventoryReport, params: EoqParams) -> Self {
        let (eoq, eoq_error) = match report.eoq {
            Ok(output) => (Some(output), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            filename: report.filename,
            original_columns: report.original_columns,
            cleaned: report.cleaned,
            warnings: report.warnings,
            ordering_cost: params.ordering_cost,
            holding_rate_pct: params.holding_rate_pct,
            eoq,
            eoq_error,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Upload exceeds the {max_bytes} byte limit")]
    UploadTooLarge { max_bytes: usize },

    #[error("No file provided; expected a multipart field named \"file\"")]
    MissingFile,

    #[error(transparent)]
    InvalidParameter(#[from] EoqError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Processing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Import(e) => ApiError::Import(e),
            ServiceError::Export(e) => ApiError::Export(e),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Multipart(_) | ApiError::MissingFile | ApiError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Import(ImportError::UnsupportedFileType { .. }) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ApiError::UploadTooLarge { .. } | ApiError::Import(ImportError::TableTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Import(_) | ApiError::Export(ExportError::NoColumns) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Export(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/inventory/clean", post(clean_inventory))
        .route("/inventory/export", post(export_inventory))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[instrument]
async fn health() -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

/// Fields pulled out of an upload form
struct UploadForm {
    filename: String,
    bytes: Vec<u8>,
    ordering_cost: Option<String>,
    holding_rate: Option<String>,
}

/// Body-limit rejections surface as 413, anything else as a malformed upload
fn multipart_error(e: MultipartError, max_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::UploadTooLarge { max_bytes }
    } else {
        ApiError::Multipart(e.body_text())
    }
}

async fn read_upload(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm, ApiError> {
    let mut file = None;
    let mut ordering_cost = None;
    let mut holding_rate = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;
                file = Some((filename, bytes.to_vec()));
            }
            "ordering_cost" => {
                ordering_cost = Some(field.text().await.map_err(|e| multipart_error(e, max_bytes))?);
            }
            "holding_rate" => {
                holding_rate = Some(field.text().await.map_err(|e| multipart_error(e, max_bytes))?);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let (filename, bytes) = file.ok_or(ApiError::MissingFile)?;
    Ok(UploadForm {
        filename,
        bytes,
        ordering_cost,
        holding_rate,
    })
}

fn parse_param(name: &'static str, raw: Option<&str>, default: f64) -> Result<f64, EoqError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => s.parse::<f64>().map_err(|_| EoqError::InvalidParameter {
            name,
            msg: format!("not a number: {s:?}"),
        }),
    }
}

#[instrument(skip(state, multipart))]
async fn clean_inventory(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CleanResponse>, ApiError> {
    let form = read_upload(multipart, state.max_upload_bytes).await?;
    let params = EoqParams::new(
        parse_param(
            "ordering_cost",
            form.ordering_cost.as_deref(),
            state.default_params.ordering_cost,
        )?,
        parse_param(
            "holding_rate",
            form.holding_rate.as_deref(),
            state.default_params.holding_rate_pct,
        )?,
    )?;
    debug!("Cleaning {} with {:?}", form.filename, params);

    let service = state.inventory_service.clone();
    let UploadForm { filename, bytes, .. } = form;
    let report = tokio::task::spawn_blocking(move || service.process(&filename, &bytes, &params))
        .await??;

    info!(
        "Cleaned {}: {} rows, {} columns",
        report.filename,
        report.cleaned.rows.len(),
        report.cleaned.columns.len()
    );
    Ok(Json(CleanResponse::from_report(report, params)))
}

#[instrument(skip(state, multipart))]
async fn export_inventory(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let UploadForm { filename, bytes, .. } =
        read_upload(multipart, state.max_upload_bytes).await?;

    let service = state.inventory_service.clone();
    let csv = tokio::task::spawn_blocking(move || service.export_cleaned(&filename, &bytes))
        .await??;

    info!("Exported cleaned inventory ({} bytes)", csv.len());
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CLEANED_EXPORT_FILENAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
