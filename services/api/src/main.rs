use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

use api::{
    middleware::JwtVerifier,
    repositories::{
        CatalogRepository, ContactRepository, InventoryRepository, MediaRepository,
        PageRepository, SaleRepository, UserRepository,
    },
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply pending migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    // Verifier for access tokens issued by the auth service
    let jwt_verifier = JwtVerifier::from_env()?;

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let catalog_repository = CatalogRepository::new(pool.clone());
    let inventory_repository = InventoryRepository::new(pool.clone());
    let sale_repository = SaleRepository::new(pool.clone());
    let page_repository = PageRepository::new(pool.clone());
    let media_repository = MediaRepository::new(pool.clone());
    let contact_repository = ContactRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        jwt_verifier,
        user_repository,
        catalog_repository,
        inventory_repository,
        sale_repository,
        page_repository,
        media_repository,
        contact_repository,
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let addr = std::env::var("API_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
