use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::domain::clock::{Clock, SystemClock};
use crate::infrastructure::config::ConfigService;
use crate::infrastructure::csv::{CsvRecordStore, RecordStore};
use crate::infrastructure::storage::ensure_data_dir;
use crate::interfaces::http::{add_log, start_server, HttpState};

pub fn run() -> std::io::Result<()> {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();

    let config = ConfigService::new()
        .load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let data_dir = ensure_data_dir(&config.data_dir)?;
    tracing::info!(
        data_dir = %data_dir.display(),
        host = %config.host,
        port = config.port,
        "Starting storyqa"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let store: Arc<dyn RecordStore> = Arc::new(CsvRecordStore::new(data_dir, clock.clone()));
    let state = HttpState::new(store, clock, config.broadcast_capacity);
    add_log(&state.logs, "INFO", "Bootstrap", "Record store ready");

    actix_web::rt::System::new().block_on(async move {
        let server = start_server(&config, state)?;
        server.await
    })
}
