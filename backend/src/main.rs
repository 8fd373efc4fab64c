use std::sync::Arc;

use backend::api;
use backend::config::Config;
use backend::engines::{Commentator, OpponentEngine};
use backend::session::SessionStore;
use commentary::CommentaryClient;
use tokio::net::TcpListener;
use uci_engine::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    dotenv::dotenv().ok();
    let config = Config::load()?;

    let engine: Arc<dyn OpponentEngine> = Arc::new(Engine::new(&config.engine_path));
    let commentator: Option<Arc<dyn Commentator>> = match &config.commentary_url {
        Some(url) => Some(Arc::new(CommentaryClient::new(url.clone())?)),
        None => None,
    };
    let store = Arc::new(SessionStore::new(engine, commentator, config.movetime));

    let app = api::router(store).layer(api::cors_layer(&config.cors_origins));
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("API listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
