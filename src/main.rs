use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use datalens::application::{CsvImportUseCase, DatasetIngestionUseCase, SampleSeeder};
use datalens::infrastructure::config::AppConfig;
use datalens::infrastructure::db::connection::init_db;
use datalens::infrastructure::db::datasets::{DatasetStore, SqliteDatasetStore};
use datalens::interfaces::http::{start_server, HttpState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let config = AppConfig::load().map_err(to_io_err)?;

    let pool = init_db(Path::new(&config.database_path))
        .await
        .map_err(to_io_err)?;

    let store: Arc<dyn DatasetStore> = Arc::new(SqliteDatasetStore::new(pool));
    let ingestion = Arc::new(DatasetIngestionUseCase::new(
        store.clone(),
        config.row_batch_size,
    ));
    let import = Arc::new(CsvImportUseCase::new(
        ingestion.clone(),
        config.max_fetch_bytes,
    ));

    if config.seed_samples {
        let seeded = SampleSeeder::new(store.clone(), ingestion.clone())
            .seed()
            .await
            .map_err(to_io_err)?;
        info!(seeded, "Sample datasets ready");
    }

    info!(host = %config.host, port = config.port, db = %config.database_path, "Starting datalens");

    start_server(
        &config,
        HttpState {
            store,
            ingestion,
            import,
        },
    )?
    .await
}

fn to_io_err(err: datalens::domain::error::AppError) -> std::io::Error {
    std::io::Error::other(err.to_string())
}
