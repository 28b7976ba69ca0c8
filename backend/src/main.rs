use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

#[tokio::main]
async fn main() -> Result<(), backend::ServiceError> {
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("backend")
                || meta.target().contains("fraglog")
                || meta.target().contains("tower_http")
        }));
    if let Err(e) = tracing::subscriber::set_global_default(registry) {
        eprintln!("Setting up tracing: {}", e);
    }

    let args = backend::cli::Cli::parse();

    tracing::info!("Starting...");

    tracing::info!("Applying Migrations");
    let database_url = args.database_url.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = backend::db_connection(&database_url)?;
        backend::run_migrations(&mut connection)
    })
    .await??;
    tracing::info!("Completed Migrations");

    let engine = fraglog::LogIngestionEngine::new(args.ingest_config());

    match args.command {
        backend::cli::Command::Serve { bind } => {
            let router = axum::Router::new()
                .nest(
                    "/api",
                    backend::api::router(backend::api::ApiState {
                        database_url: args.database_url,
                        engine,
                    }),
                )
                .layer(tower_http::trace::TraceLayer::new_for_http());

            tracing::info!("Listening on {}", bind);
            let listener = tokio::net::TcpListener::bind(bind.as_str()).await?;
            axum::serve(listener, router).await?;
        }
        backend::cli::Command::Ingest { file } => {
            let content = tokio::fs::read_to_string(&file).await?;
            tracing::info!("Ingesting {:?}", file);

            let database_url = args.database_url;
            let result = tokio::task::spawn_blocking(move || {
                let mut connection = backend::db_connection(&database_url)?;
                backend::ingest(&mut connection, &engine, &content)
            })
            .await?;

            let result: common::UploadResult = match result {
                Ok(report) => report.into(),
                Err(e) if e.is_rejection() => backend::api::uploads::rejected(&e),
                Err(e) => return Err(e),
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
