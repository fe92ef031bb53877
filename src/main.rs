//! SiteHub Server — multi-tenant static-site hosting platform
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use sitehub_auth::jwt::decoder::JwtDecoder;
use sitehub_auth::jwt::encoder::JwtEncoder;
use sitehub_auth::password::PasswordHasher;
use sitehub_core::config::AppConfig;
use sitehub_core::error::AppError;
use sitehub_entity::store::{PermissionStore, ProjectStore, UserStore, VersionStore};
use sitehub_entity::user::{CreateUser, UserRole};
use sitehub_storage::layout::SiteLayout;

#[tokio::main]
async fn main() {
    let env = std::env::var("SITEHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SiteHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Filesystem layout ────────────────────────────────
    let layout = SiteLayout::new(&config.storage);
    layout.ensure_roots().await?;

    // ── Step 2: Database connection + migrations ─────────────────
    let db_pool = sitehub_database::connection::create_pool(&config.database).await?;
    sitehub_database::migration::run_migrations(&db_pool).await?;

    // ── Step 3: Repositories ─────────────────────────────────────
    let user_repo: Arc<dyn UserStore> = Arc::new(
        sitehub_database::repositories::user::UserRepository::new(db_pool.clone()),
    );
    let project_repo: Arc<dyn ProjectStore> = Arc::new(
        sitehub_database::repositories::project::ProjectRepository::new(db_pool.clone()),
    );
    let version_repo: Arc<dyn VersionStore> = Arc::new(
        sitehub_database::repositories::version::VersionRepository::new(db_pool.clone()),
    );
    let permission_repo: Arc<dyn PermissionStore> = Arc::new(
        sitehub_database::repositories::permission::PermissionRepository::new(db_pool.clone()),
    );

    // ── Step 4: Auth ─────────────────────────────────────────────
    let password_hasher = PasswordHasher::new();
    let jwt_encoder = JwtEncoder::new(&config.auth);
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    ensure_admin_account(&*user_repo, &password_hasher).await?;

    // ── Step 5: Services ─────────────────────────────────────────
    let user_service = Arc::new(sitehub_service::user::UserService::new(
        Arc::clone(&user_repo),
        password_hasher,
        jwt_encoder,
        config.auth.password_min_length,
    ));
    let project_service = Arc::new(sitehub_service::project::ProjectService::new(
        Arc::clone(&project_repo),
        Arc::clone(&user_repo),
        Arc::clone(&permission_repo),
    ));
    let publication_service = Arc::new(sitehub_service::publication::PublicationService::new(
        Arc::clone(&project_repo),
        Arc::clone(&version_repo),
        Arc::clone(&permission_repo),
        layout.clone(),
        config.storage.max_upload_size_bytes,
    ));
    let preview_service = Arc::new(sitehub_service::preview::PreviewService::new(
        Arc::clone(&version_repo),
        layout,
    ));

    // ── Step 6: HTTP server ──────────────────────────────────────
    let state = sitehub_api::state::AppState {
        config: Arc::new(config.clone()),
        db_pool,
        jwt_decoder,
        user_service,
        project_service,
        publication_service,
        preview_service,
    };

    let router = sitehub_api::router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("SiteHub listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("SiteHub shut down");
    Ok(())
}

/// Create the default admin account on first start.
async fn ensure_admin_account(
    users: &dyn UserStore,
    hasher: &PasswordHasher,
) -> Result<(), AppError> {
    if users.find_by_username("admin").await?.is_some() {
        return Ok(());
    }

    let password_hash = hasher.hash_password("admin123")?;
    users
        .create(&CreateUser {
            username: "admin".to_string(),
            email: None,
            password_hash,
            role: UserRole::Admin,
        })
        .await?;

    tracing::warn!("Created default admin account 'admin'; change its password immediately");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
