use yt_keyword_downloader::{config::Config, handlers::AppState, schema::schema};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();
    log::info!("Starting keyword downloader...");

    let mut config = Config::from_env()?;

    // yt-dlp is handed absolute paths so the names it prints stay absolute.
    tokio::fs::create_dir_all(&config.download_dir).await?;
    config.download_dir = tokio::fs::canonicalize(&config.download_dir).await?;
    log::info!("Download directory: {}", config.download_dir.display());
    log::info!("Filename policy: {}", config.filename_policy);

    let app = schema(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl+C handler: {}", e);
    }
}
