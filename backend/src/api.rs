pub mod matches;
pub mod players;
pub mod statistics;
pub mod uploads;

#[derive(Debug, Clone)]
pub struct ApiState {
    pub database_url: String,
    pub engine: fraglog::LogIngestionEngine,
}

pub fn router(state: ApiState) -> axum::Router {
    let state = std::sync::Arc::new(state);

    axum::Router::new()
        .nest("/uploads", uploads::router(state.clone()))
        .nest("/matches", matches::router(state.clone()))
        .nest("/players", players::router(state.clone()))
        .merge(statistics::router(state))
}
