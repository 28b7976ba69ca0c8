use super::ApiState;
use axum::extract::{Query, State};
use axum::response::Json;
use fraglog::StatisticsAggregator;
use std::sync::Arc;

#[derive(Debug, serde::Deserialize)]
pub struct RankingsQuery {
    pub limit: Option<usize>,
}

pub fn router(state: Arc<ApiState>) -> axum::Router {
    axum::Router::new()
        .route("/statistics", axum::routing::get(summary))
        .route("/rankings", axum::routing::get(rankings))
        .with_state(state)
}

#[tracing::instrument(skip(state))]
async fn summary(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<common::statistics::GlobalSummary>, crate::ServiceError> {
    let summary = crate::with_store(&state.database_url, |store| {
        Ok(StatisticsAggregator::new(store).summary()?)
    })
    .await?;

    Ok(Json(summary))
}

#[tracing::instrument(skip(state))]
async fn rankings(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<RankingsQuery>,
) -> Result<Json<Vec<common::statistics::PlayerRanking>>, crate::ServiceError> {
    let rankings = crate::with_store(&state.database_url, move |store| {
        let mut aggregator = StatisticsAggregator::new(store);
        Ok(match query.limit {
            Some(limit) => aggregator.top_players(limit)?,
            None => aggregator.global_rankings()?,
        })
    })
    .await?;

    Ok(Json(rankings))
}
