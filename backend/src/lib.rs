pub mod models;
pub mod schema;

mod store;
pub use store::PgStore;

mod error;
pub use error::{upload_error_message, ServiceError};

pub mod cli;

use diesel::Connection;

/// Blocking diesel connection driven by the tokio based postgres driver.
pub type DbConnection = diesel_async::async_connection_wrapper::AsyncConnectionWrapper<
    diesel_async::AsyncPgConnection,
>;

pub const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("../migrations/");

pub fn db_connection(database_url: &str) -> Result<DbConnection, diesel::ConnectionError> {
    DbConnection::establish(database_url).map_err(|e| {
        tracing::error!("Connecting to database: {:?}", e);
        e
    })
}

pub fn run_migrations(connection: &mut DbConnection) -> Result<(), ServiceError> {
    use diesel_migrations::MigrationHarness;

    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| ServiceError::Migrations(e.to_string()))?;
    tracing::info!("Applied {} migrations", applied.len());

    Ok(())
}

/// Ingests a whole document, nothing is kept if it gets rejected.
pub fn ingest(
    connection: &mut DbConnection,
    engine: &fraglog::LogIngestionEngine,
    content: &str,
) -> Result<fraglog::IngestReport, ServiceError> {
    connection.transaction::<_, ServiceError, _>(|conn| {
        let mut store = PgStore::new(conn);
        Ok(engine.ingest(&mut store, content)?)
    })
}

/// Runs `func` against a fresh connection on the blocking thread pool.
pub async fn with_store<T, F>(database_url: &str, func: F) -> Result<T, ServiceError>
where
    F: FnOnce(&mut PgStore<'_>) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let database_url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut connection = db_connection(&database_url)?;
        let mut store = PgStore::new(&mut connection);
        func(&mut store)
    })
    .await?
}

pub async fn get_file_from_upload(
    name: &str,
    mut form: axum::extract::Multipart,
) -> Option<axum::body::Bytes> {
    while let Ok(field) = form.next_field().await {
        let field = field?;

        if field.name().map(|n| n != name).unwrap_or(false) {
            continue;
        }

        if let Ok(data) = field.bytes().await {
            return Some(data);
        }
    }

    None
}

pub mod api;
