//! Application state shared across handlers

use sqlx::PgPool;

use crate::middleware::JwtVerifier;
use crate::repositories::{
    CatalogRepository, ContactRepository, InventoryRepository, MediaRepository, PageRepository,
    SaleRepository, UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_verifier: JwtVerifier,
    pub user_repository: UserRepository,
    pub catalog_repository: CatalogRepository,
    pub inventory_repository: InventoryRepository,
    pub sale_repository: SaleRepository,
    pub page_repository: PageRepository,
    pub media_repository: MediaRepository,
    pub contact_repository: ContactRepository,
}
