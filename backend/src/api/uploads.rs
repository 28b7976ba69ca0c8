use super::ApiState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;

const FIELD_NAME: &str = "log_file";

pub fn router(state: Arc<ApiState>) -> axum::Router {
    axum::Router::new()
        .route(
            "/",
            axum::routing::post(upload)
                .layer(axum::extract::DefaultBodyLimit::max(100 * 1024 * 1024)),
        )
        .with_state(state)
}

#[tracing::instrument(skip(state, form))]
async fn upload(
    State(state): State<Arc<ApiState>>,
    form: axum::extract::Multipart,
) -> Result<(StatusCode, Json<common::UploadResult>), crate::ServiceError> {
    let file_content = crate::get_file_from_upload(FIELD_NAME, form)
        .await
        .ok_or(crate::ServiceError::MissingUpload(FIELD_NAME))?;
    let content = String::from_utf8_lossy(&file_content).into_owned();

    tracing::info!("Received log upload of {} bytes", content.len());

    let result = tokio::task::spawn_blocking(move || {
        let mut connection = crate::db_connection(&state.database_url)?;
        crate::ingest(&mut connection, &state.engine, &content)
    })
    .await?;

    match result {
        Ok(report) => {
            tracing::info!("Processed {} lines", report.processed);
            Ok((StatusCode::OK, Json(report.into())))
        }
        Err(e) if e.is_rejection() => {
            tracing::warn!("Rejected upload: {}", e);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(rejected(&e))))
        }
        Err(e) => Err(e),
    }
}

pub fn rejected(error: &crate::ServiceError) -> common::UploadResult {
    common::UploadResult {
        processed: 0,
        errors: Some(vec![crate::upload_error_message(error)]),
    }
}
