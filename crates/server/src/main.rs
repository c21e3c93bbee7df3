//! NET-EST Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use net_est_config::{load_settings, PersistenceBackend, Settings};
use net_est_embedding::EmbeddingService;
use net_est_server::{create_router, init_metrics, AppState};
use net_est_store::{FilesystemStore, SqliteStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = std::env::var("NET_EST_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("warning: failed to load config: {e}. using defaults.");
            Settings::default()
        }
    };

    init_tracing(&settings);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), environment = ?settings.environment, "starting net-est-server");

    let metrics_handle = init_metrics();
    tracing::info!("prometheus metrics installed at /metrics");

    let embedding = Arc::new(build_embedding_service(&settings));
    tracing::info!(degraded = embedding.is_degraded(), model = embedding.model_version(), "embedder initialized");

    let store = build_store(&settings)?;

    let state = AppState::new(settings.clone(), embedding, store, metrics_handle);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

fn build_embedding_service(settings: &Settings) -> EmbeddingService {
    match &settings.embedder.model_path {
        Some(dir) => {
            let model_path = std::path::Path::new(dir).join("model.onnx");
            let tokenizer_path = std::path::Path::new(dir).join("tokenizer.json");
            EmbeddingService::load(
                Some(&model_path),
                Some(&tokenizer_path),
                net_est_embedding::OnnxEmbedderConfig {
                    model_version: settings.embedder.model_id.clone(),
                    batch_size: settings.embedder.batch_size,
                    ..Default::default()
                },
                settings.embedder.cache_capacity,
            )
        }
        None => EmbeddingService::degraded(settings.embedder.cache_capacity),
    }
}

fn build_store(settings: &Settings) -> Result<Arc<dyn net_est_store::AnnotationStore>, Box<dyn std::error::Error>> {
    match settings.persistence.backend {
        PersistenceBackend::Filesystem => {
            let store = FilesystemStore::new(settings.persistence.path.as_str())?;
            Ok(Arc::new(store))
        }
        PersistenceBackend::Sqlite => {
            let store = SqliteStore::open(settings.persistence.path.as_str())?;
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received sigterm, shutting down"),
    }
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("net_est={level},tower_http=info").into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
