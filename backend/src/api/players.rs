use super::ApiState;
use axum::extract::{Path, State};
use axum::response::Json;
use fraglog::model::PlayerId;
use fraglog::StatisticsAggregator;
use std::sync::Arc;

pub fn router(state: Arc<ApiState>) -> axum::Router {
    axum::Router::new()
        .route("/:id", axum::routing::get(profile))
        .with_state(state)
}

#[tracing::instrument(skip(state))]
async fn profile(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<i64>,
) -> Result<Json<common::statistics::PlayerProfile>, crate::ServiceError> {
    let profile = crate::with_store(&state.database_url, move |store| {
        StatisticsAggregator::new(store)
            .player_profile(PlayerId(id))?
            .ok_or(crate::ServiceError::NotFound {
                entity: "player",
                id,
            })
    })
    .await?;

    Ok(Json(profile))
}
