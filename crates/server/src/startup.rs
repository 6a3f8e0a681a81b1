use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::http::HeaderValue;
use axum::Router;
use configs::{AppConfig, CorsConfig, ImageStoreBackend, StorageBackend};
use service::characters::{seed, CharacterRepository, CharacterService, InMemoryCharacterRepository, SeaOrmCharacterRepository};
use service::images::{BlobLocator, DaprBlobImageResolver, ImageResolver, InMemoryImageResolver};
use service::settings::SettingsService;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::routes;
use crate::state::AppState;

/// Allowed origins from config; an empty list means permissive.
pub fn build_cors(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn build_repository(cfg: &AppConfig) -> anyhow::Result<Arc<dyn CharacterRepository>> {
    let repo: Arc<dyn CharacterRepository> = match cfg.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryCharacterRepository::new()),
        StorageBackend::Database => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            models::db::ensure_schema(&db).await?;
            Arc::new(SeaOrmCharacterRepository::new(db))
        }
    };
    if cfg.storage.seed_demo_data {
        seed::seed_if_empty(repo.as_ref()).await?;
    }
    Ok(repo)
}

fn build_image_resolver(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ImageResolver>> {
    let resolver: Arc<dyn ImageResolver> = match cfg.image_store.backend {
        ImageStoreBackend::Memory => Arc::new(InMemoryImageResolver::new(BlobLocator::from_config(&cfg.image_store))),
        ImageStoreBackend::Dapr => Arc::new(DaprBlobImageResolver::from_config(&cfg.image_store)?),
    };
    Ok(resolver)
}

/// Construct the process-wide state: store, resolver, services.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let repo = build_repository(cfg).await?;
    let images = build_image_resolver(cfg)?;
    info!(
        store = repo.backend_name(),
        image_store = images.backend_name(),
        "character service wired"
    );
    let characters = CharacterService::new(repo, images)
        .with_image_timeout(Duration::from_millis(cfg.image_store.timeout_ms));
    let settings = SettingsService::new(cfg.settings_as_strings());
    Ok(AppState::new(characters, settings))
}

/// Build the router for a given configuration.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors(&cfg.cors)))
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting character catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining connections");
        })
        .await?;
    Ok(())
}
