//! Personal Assistant Chatbot - Rust Backend
//!
//! Answers questions about one person by sending their personal information
//! document together with the user's question to Gemini.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod llm;
mod user_data;

use llm::LlmEngine;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug level logging
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Personal information document used as chat context
    #[arg(long, env = "USER_DATA_FILE", default_value = "user_data.txt")]
    user_data: PathBuf,

    /// Directory holding the frontend (index.html and assets)
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Directory for the rolling log files
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<LlmEngine>,
    pub user_data_path: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so it can feed both the CLI env fallbacks and GEMINI_API_KEY
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Determine log level based on --debug flag
    let log_level = if args.debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Initialize logging (File + Stdout)
    let file_appender = tracing_appender::rolling::daily(&args.log_dir, "personal_assistant.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    tracing::info!("Log level: {}", log_level);

    // The connectivity probe is a blocking HTTP call
    let llm = tokio::task::spawn_blocking(LlmEngine::from_env).await?;
    let status = llm.status();
    tracing::info!(
        "LLM backend: {} (model: {}, ready: {})",
        status.backend,
        status.model.as_deref().unwrap_or("none"),
        status.ready
    );

    let app_state = AppState {
        llm: Arc::new(llm),
        user_data_path: args.user_data,
    };

    let app = api::router(app_state, &args.static_dir);

    // Start server
    let addr = SocketAddr::new(args.host, args.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
