mod classify;
mod config;
mod day;
mod error;
mod http;
mod scheduler;
mod source;
mod storage;
mod types;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env é opcional; variáveis já exportadas têm precedência
    dotenvy::dotenv().ok();

    // Inicializa o sistema de logging (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapa_quedas=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Sem chave do mapa o serviço não sobe
    let config = config::Config::load()?;
    let tz = config.tz()?;
    info!("Configuração carregada (fuso {}, porta {})", tz, config.port);

    // Baseline salvo em execuções anteriores, se houver
    let store = storage::SnapshotStore::new(&config.state_file);
    let saved = store.load().await;

    let source = source::PseClient::new(&config.upstream_url, config.fetch_timeout())?;
    let service = Arc::new(scheduler::OutageService::new(
        Arc::new(source),
        store,
        tz,
        saved,
    ));

    // Coleta inicial + timer periódico
    let _scheduler: task::JoinHandle<()> = task::spawn(scheduler::run_scheduler(
        Arc::clone(&service),
        config.poll_interval(),
    ));

    let state = Arc::new(http::AppState {
        service,
        maps_api_key: config.google_maps_api_key.clone(),
    });
    let app = http::router(state, &config.public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Servidor rodando em http://localhost:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
