use super::ApiState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use fraglog::model::MatchId;
use fraglog::store::MatchRepository;
use fraglog::StatisticsAggregator;
use std::sync::Arc;

pub fn router(state: Arc<ApiState>) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(list))
        .route("/:id", axum::routing::get(summary).delete(remove))
        .with_state(state)
}

#[tracing::instrument(skip(state))]
async fn list(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<common::MatchOverview>>, crate::ServiceError> {
    let overview = crate::with_store(&state.database_url, |store| {
        Ok(StatisticsAggregator::new(store).match_overview()?)
    })
    .await?;

    Ok(Json(overview))
}

#[tracing::instrument(skip(state))]
async fn summary(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<Json<common::statistics::MatchSummary>, crate::ServiceError> {
    let summary = crate::with_store(&state.database_url, move |store| {
        StatisticsAggregator::new(store)
            .match_statistics(MatchId(id))?
            .ok_or(crate::ServiceError::NotFound { entity: "match", id })
    })
    .await?;

    Ok(Json(summary))
}

#[tracing::instrument(skip(state))]
async fn remove(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, crate::ServiceError> {
    let deleted = crate::with_store(&state.database_url, move |store| {
        Ok(store.delete_match(MatchId(id))?)
    })
    .await?;

    if !deleted {
        return Err(crate::ServiceError::NotFound { entity: "match", id });
    }

    tracing::info!("Deleted match {}", id);
    Ok(StatusCode::NO_CONTENT)
}
