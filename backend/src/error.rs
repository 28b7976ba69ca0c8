use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fraglog::{IngestError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("database: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connecting to database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("running migrations: {0}")]
    Migrations(String),
    #[error("blocking task: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("missing upload field {0:?}")]
    MissingUpload(&'static str),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

impl ServiceError {
    /// The ingestion rejected the document itself, as opposed to failing on the way.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Ingest(
                IngestError::EmptyContent
                    | IngestError::NoValidLines
                    | IngestError::AlreadyProcessed(_)
            )
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            _ if self.is_rejection() => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MissingUpload(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::Store(StoreError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Handling request: {}", self);
        } else {
            tracing::debug!("Rejecting request: {}", self);
        }
        status.into_response()
    }
}

/// Message shown to whoever uploaded the document.
pub fn upload_error_message(error: &ServiceError) -> String {
    match error {
        ServiceError::Ingest(IngestError::EmptyContent) => "The uploaded file is empty".to_owned(),
        ServiceError::Ingest(IngestError::NoValidLines) => "No valid log lines found".to_owned(),
        ServiceError::Ingest(IngestError::AlreadyProcessed(ids)) => format!(
            "Log contains already processed matches: {}",
            ids.join(", ")
        ),
        _ => "Unexpected error".to_owned(),
    }
}
