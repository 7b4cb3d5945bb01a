use std::sync::Arc;

use clap::Parser;
use duree::assets;
use duree::config::{Cli, Settings};
use duree::handler::AppState;
use duree::store::BookmarkStore;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Lets ${VAR} placeholders in the config file come from a local .env.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("duree.svc starting");

    let settings = Settings::resolve(&args).unwrap_or_else(|e| {
        tracing::error!(error = %format!("{:#}", e), "failed to load config");
        std::process::exit(1);
    });

    // Serving without the page or its assets would only hand out broken pages.
    if let Err(e) = assets::verify() {
        tracing::error!(error = %e, "failed to verify static assets");
        std::process::exit(1);
    }

    let store = Arc::new(BookmarkStore::new(&settings.bookmark_file));
    tracing::info!(path = %store.path().display(), "using bookmarks file");

    let app = duree::router(AppState { store });

    let listener = tokio::net::TcpListener::bind(&settings.listen_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, addr = %settings.listen_addr, "failed to setup tcp listener");
            std::process::exit(1);
        });

    tracing::info!("duree.svc running on {}", &settings.listen_addr);
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(err) = result {
                tracing::error!(error = %err, "server exited with error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("ctrl+c signal received, shutting down");
        }
    }

    tracing::info!("duree.svc going off");
}
