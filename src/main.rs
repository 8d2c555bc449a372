use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use simavi::application::ports::{ImageRepository, SessionCodec, UserRepository};
use simavi::application::services::{
    AnalysisService, AuthMode, AuthService, ExportService, ImageService, RetentionSweeper,
};
use simavi::infrastructure::auth::{BcryptPasswordHasher, JsonSessionCodec, SharedFlagCodec};
use simavi::infrastructure::llm::create_vision_client;
use simavi::infrastructure::observability::{TracingConfig, init_tracing};
use simavi::infrastructure::persistence::{
    InMemoryImageRepository, InMemoryUserRepository, PgImageRepository, PgUserRepository,
    create_pool,
};
use simavi::infrastructure::storage::ImageStoreFactory;
use simavi::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    init_tracing(&TracingConfig::new(
        settings.environment,
        settings.logging.json,
    ))?;
    tracing::info!(
        environment = %settings.environment,
        port = settings.server.port,
        auth_mode = ?settings.auth.mode,
        vision_provider = %settings.vision.provider,
        "Starting simavi"
    );

    let (image_repository, user_repository): (Arc<dyn ImageRepository>, Arc<dyn UserRepository>) =
        match settings.database.url.as_deref() {
            Some(url) => {
                let pool = create_pool(url, settings.database.max_connections).await?;
                (
                    Arc::new(PgImageRepository::new(pool.clone())),
                    Arc::new(PgUserRepository::new(pool)),
                )
            }
            None => {
                tracing::warn!("No database configured, records are kept in memory");
                (
                    Arc::new(InMemoryImageRepository::new()),
                    Arc::new(InMemoryUserRepository::new()),
                )
            }
        };

    let image_store = ImageStoreFactory::create(&settings.storage)?;
    let vision_client = Arc::new(create_vision_client(&settings.vision)?);

    let image_service = Arc::new(ImageService::new(
        Arc::clone(&image_repository),
        Arc::clone(&image_store),
        settings.storage.folder_prefix.clone(),
    ));
    let analysis_service = Arc::new(AnalysisService::new(
        Arc::clone(&image_repository),
        Arc::clone(&image_store),
        vision_client,
    ));
    let export_service = Arc::new(ExportService::new(
        Arc::clone(&image_repository),
        Arc::clone(&image_store),
    ));
    let auth_service = Arc::new(AuthService::new(
        settings.auth.mode,
        user_repository,
        Arc::new(BcryptPasswordHasher::default()),
        settings.auth.app_password.clone(),
    ));
    let sessions: Arc<dyn SessionCodec> = match settings.auth.mode {
        AuthMode::Users => Arc::new(JsonSessionCodec),
        AuthMode::SharedPassword => Arc::new(SharedFlagCodec),
    };

    let retention_sweeper = Arc::new(RetentionSweeper::new(
        Arc::clone(&image_service),
        settings.retention.max_age(),
        settings.retention.sweep_interval(),
    ));
    tokio::spawn(Arc::clone(&retention_sweeper).run());

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;

    let state = AppState {
        image_service,
        analysis_service,
        export_service,
        auth_service,
        retention_sweeper,
        sessions,
        settings,
    };

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
