use std::net::SocketAddr;
use std::sync::Arc;

use interview_backend::{
    config::{get_config, init_config},
    routes,
    storage::{file::FileStorage, memory::MemoryStorage, Storage},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_backend=info,tower_http=info".into()),
        )
        .init();

    init_config()?;
    let config = get_config();

    let storage: Arc<dyn Storage> = match &config.data_file {
        Some(path) => {
            info!("Persisting sessions to {}", path.display());
            Arc::new(FileStorage::open(path.clone()).await?)
        }
        None => {
            info!("No DATA_FILE configured; using in-memory storage");
            Arc::new(MemoryStorage::new())
        }
    };

    if config.google_api_key.is_none() {
        info!("GOOGLE_API_KEY not set; question generation and scoring use the static paths");
    }

    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let app_state = AppState::new(storage);
    let app = routes::app_router(app_state, config.public_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
