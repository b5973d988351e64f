//! API service routes
//!
//! The guard middleware is layered over the whole router; it lets public
//! paths through and enforces the route table for everything else. Handlers
//! that need finer-than-prefix permissions (method-granular deletes, user
//! management) re-check the permission table themselves.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, access_guard},
    models::{
        MessageQuery, NewCategory, NewContactMessage, NewPage, NewProduct, NewSale, Product,
        ProductQuery, RegisterMediaRequest, Sale, SaleQuery, UpdateCategory, UpdatePage,
        UpdateProduct, UpsertStockRequest,
        contact::MessageKind,
        sale::SummaryQuery,
        user::{CreateUserRequest, UpdateUserRequest},
    },
    rbac::{self, Action},
    state::AppState,
    validation,
};

/// Paginated product listing response
#[derive(Serialize)]
pub struct ProductListResponse {
    pub items: Vec<Product>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Paginated sale listing response
#[derive(Serialize)]
pub struct SaleListResponse {
    pub items: Vec<Sale>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Query parameters for a stock-level lookup
#[derive(Deserialize)]
pub struct QuantityQuery {
    pub product_id: Uuid,
    pub location: String,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public surface
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/pages/:slug", get(get_public_page))
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/contact", post(submit_contact))
        .route("/quote", post(submit_quote))
        // Admin surface
        .route("/admin", get(dashboard))
        .route("/admin/users", get(list_users).post(create_user))
        .route(
            "/admin/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/admin/categories", get(list_categories).post(create_category))
        .route(
            "/admin/categories/:id",
            put(update_category).delete(delete_category),
        )
        .route("/admin/products", get(list_products).post(create_product))
        .route(
            "/admin/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/admin/inventory", get(list_inventory))
        .route("/admin/inventory/stock", put(upsert_stock))
        .route("/admin/inventory/quantity", get(get_quantity))
        .route("/admin/inventory/low-stock", get(list_low_stock))
        .route("/admin/inventory/:id", delete(delete_inventory_item))
        .route("/admin/sales", get(list_sales).post(create_sale))
        .route("/admin/sales/:id", get(get_sale))
        .route("/admin/reports/sales-summary", get(sales_summary))
        .route("/admin/reports/low-stock", get(list_low_stock))
        .route("/admin/pages", get(list_pages).post(create_page))
        .route(
            "/admin/pages/:id",
            get(get_page).put(update_page).delete(delete_page),
        )
        .route("/admin/media", get(list_media).post(register_media))
        .route("/admin/media/:id", get(get_media).delete(delete_media))
        .route("/admin/messages", get(list_messages))
        .route(
            "/admin/messages/:id",
            get(get_message).delete(delete_message),
        )
        .route("/admin/messages/:id/handled", post(mark_message_handled))
        .layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .with_state(state)
}

/// Re-check the permission table for method-granular actions
fn ensure(user: &AuthUser, action: Action) -> Result<(), ApiError> {
    if user.role.allows(action) {
        Ok(())
    } else {
        Err(ApiError::Forbidden {
            required: rbac::allowed_roles(action),
            current: user.role,
        })
    }
}

/// Service banner
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": "terrasol-api",
        "status": "ok"
    }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Staff dashboard: the caller's identity and the areas their role opens
pub async fn dashboard(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    let areas: Vec<&str> = [
        (Action::ManageUsers, "users"),
        (Action::EditCatalogEntry, "catalog"),
        (Action::ManageInventory, "inventory"),
        (Action::ProcessSales, "sales"),
        (Action::ViewReports, "reports"),
    ]
    .into_iter()
    .filter(|(action, _)| user.role.allows(*action))
    .map(|(_, area)| area)
    .collect();

    Json(json!({
        "user_id": user.id,
        "role": user.role.as_str(),
        "areas": areas,
    }))
}

// --- Pages (public) ---

/// Fetch a published page by slug
pub async fn get_public_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.page_repository.find_published_by_slug(&slug).await?;
    Ok(Json(page))
}

// --- Catalog ---

/// List products with pagination and an optional category filter
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (items, total) = state.catalog_repository.list_products(&query).await?;

    let response = ProductListResponse {
        items,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(20).clamp(1, 100),
        total,
    };

    Ok(Json(response))
}

/// Fetch a product by ID
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog_repository.find_product(id).await?;
    Ok(Json(product))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog_repository.create_product(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog_repository.update_product(id, &payload).await?;
    Ok(Json(product))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::DeleteCatalogEntry)?;
    state.catalog_repository.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state.catalog_repository.list_categories().await?;
    Ok(Json(categories))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<NewCategory>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.catalog_repository.create_category(&payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategory>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .catalog_repository
        .update_category(id, &payload)
        .await?;
    Ok(Json(category))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::DeleteCatalogEntry)?;
    state.catalog_repository.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Users ---

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::ManageUsers)?;
    let users = state.user_repository.list().await?;
    Ok(Json(users))
}

/// Fetch a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::ManageUsers)?;
    let found = state.user_repository.find_by_id(id).await?;
    Ok(Json(found))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::ManageUsers)?;
    validation::validate_create_user(&payload)?;
    let created = state.user_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::ManageUsers)?;
    validation::validate_update_user(&payload)?;
    let updated = state.user_repository.update(id, &payload).await?;
    Ok(Json(updated))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::ManageUsers)?;
    state.user_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Inventory ---

/// List all stock records
pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.inventory_repository.list().await?;
    Ok(Json(items))
}

/// Create or replace a stock record
pub async fn upsert_stock(
    State(state): State<AppState>,
    Json(payload): Json<UpsertStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.quantity < 0 || payload.min_stock_level < 0 {
        return Err(ApiError::invalid(
            "quantity",
            "Quantity and minimum stock level must be non-negative",
        ));
    }
    let item = state.inventory_repository.upsert_stock(&payload).await?;
    Ok(Json(item))
}

/// Current quantity on hand for a (product, location) pair
pub async fn get_quantity(
    State(state): State<AppState>,
    Query(query): Query<QuantityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quantity = state
        .inventory_repository
        .get_quantity(query.product_id, &query.location)
        .await?;

    Ok(Json(json!({
        "product_id": query.product_id,
        "location": query.location,
        "quantity": quantity,
    })))
}

/// Stock records at or below their minimum level
pub async fn list_low_stock(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.inventory_repository.list_low_stock().await?;
    Ok(Json(items))
}

/// Delete a stock record
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.inventory_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Sales ---

/// Record a sale
pub async fn create_sale(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewSale>,
) -> Result<impl IntoResponse, ApiError> {
    ensure(&user, Action::ProcessSales)?;
    validation::validate_new_sale(&payload)?;
    let sale = state.sale_repository.create(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SaleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (items, total) = state.sale_repository.list(&query).await?;

    let response = SaleListResponse {
        items,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(20).clamp(1, 100),
        total,
    };

    Ok(Json(response))
}

/// Fetch a sale with its line items
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = state.sale_repository.get(id).await?;
    Ok(Json(sale))
}

/// Aggregated sales figures over a date range
pub async fn sales_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.sale_repository.summary(&query).await?;
    Ok(Json(summary))
}

// --- Pages (admin) ---

/// List all pages including drafts
pub async fn list_pages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let pages = state.page_repository.list().await?;
    Ok(Json(pages))
}

/// Fetch a page by ID
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.page_repository.find_by_id(id).await?;
    Ok(Json(page))
}

/// Create a page
pub async fn create_page(
    State(state): State<AppState>,
    Json(payload): Json<NewPage>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.page_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// Update a page
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePage>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.page_repository.update(id, &payload).await?;
    Ok(Json(page))
}

/// Delete a page
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.page_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Media ---

/// List media metadata
pub async fn list_media(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.media_repository.list().await?;
    Ok(Json(items))
}

/// Fetch one media item's metadata
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.media_repository.find_by_id(id).await?;
    Ok(Json(item))
}

/// Register metadata for an uploaded file
pub async fn register_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RegisterMediaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.media_repository.register(user.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Delete a media item's metadata
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.media_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Messages ---

/// Public contact-form intake
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<NewContactMessage>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_contact_message(&payload)?;
    let message = state
        .contact_repository
        .create(MessageKind::Contact, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Public quote-request intake
pub async fn submit_quote(
    State(state): State<AppState>,
    Json(payload): Json<NewContactMessage>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_contact_message(&payload)?;
    let message = state
        .contact_repository
        .create(MessageKind::Quote, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Admin message listing
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = state.contact_repository.list(&query).await?;
    Ok(Json(messages))
}

/// Fetch a message by ID
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.contact_repository.find_by_id(id).await?;
    Ok(Json(message))
}

/// Mark a message as handled
pub async fn mark_message_handled(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.contact_repository.mark_handled(id).await?;
    Ok(Json(message))
}

/// Delete a message
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.contact_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
