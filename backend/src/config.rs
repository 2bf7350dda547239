use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use crate::summary::DEFAULT_MODEL;

/// Server settings; every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Tour planning and geo audio API")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Mapbox access token used for geocoding, directions and place search
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", default_value = "", hide_env_values = true)]
    pub mapbox_access_token: String,

    #[arg(long, env = "MAPBOX_BASE_URL", default_value = "https://api.mapbox.com")]
    pub mapbox_base_url: String,

    /// API key for the chat-completions service that writes tour summaries
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub openai_api_key: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    /// PostgreSQL URL for saved client state; state stays in memory when unset
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON catalog of geo-pinned audio recordings
    #[arg(long, env = "AUDIO_CATALOG")]
    pub audio_catalog: Option<PathBuf>,

    /// Directory holding the recordings listed in the audio catalog
    #[arg(long, env = "AUDIO_DIR", default_value = "audio")]
    pub audio_dir: PathBuf,
}
