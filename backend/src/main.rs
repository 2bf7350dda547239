use std::sync::Arc;

use clap::Parser;
use pincaster::{
    audio::AudioLibrary,
    config::Config,
    create_router,
    database::Database,
    mapbox::MapboxClient,
    store::{MemoryStore, Store},
    summary::OpenAiClient,
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pincaster=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();

    if config.mapbox_access_token.is_empty() {
        tracing::warn!("MAPBOX_ACCESS_TOKEN is not set; geocoding requests will be rejected");
    }
    let geo = MapboxClient::new(&config.mapbox_base_url, &config.mapbox_access_token)?;
    let summarizer = OpenAiClient::new(
        &config.openai_base_url,
        &config.openai_api_key,
        &config.openai_model,
    )?;

    let store: Arc<dyn Store> = match config.database_url.as_deref() {
        Some(url) => {
            let db = Database::connect(url).await?;
            db.migrate().await?;
            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, saved state lives in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let audio = match &config.audio_catalog {
        Some(path) => {
            let library = AudioLibrary::from_file(path, config.audio_dir.clone())?;
            tracing::info!("loaded {} audio clips from {}", library.len(), path.display());
            library
        }
        None => {
            tracing::warn!("AUDIO_CATALOG not set, no audio clips available");
            AudioLibrary::default()
        }
    };

    let state = AppState {
        geo: Arc::new(geo),
        summarizer: Arc::new(summarizer),
        store,
        audio: Arc::new(audio),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("starting pincaster on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
