//! API models for entities and request/response payloads

pub mod catalog;
pub mod contact;
pub mod inventory;
pub mod media;
pub mod page;
pub mod sale;
pub mod user;

// Re-export for convenience
pub use catalog::{Category, NewCategory, NewProduct, Product, ProductQuery, UpdateCategory, UpdateProduct};
pub use contact::{ContactMessage, MessageKind, MessageQuery, NewContactMessage};
pub use inventory::{InventoryItem, InventoryItemWithProduct, UpsertStockRequest};
pub use media::{MediaItem, RegisterMediaRequest};
pub use page::{NewPage, Page, UpdatePage};
pub use sale::{
    NewSale, NewSaleItem, PaymentMethod, Sale, SaleDetail, SaleItemDetail, SaleQuery, SaleTotals,
    SalesSummary, SummaryQuery,
};
pub use user::{CreateUserRequest, UpdateUserRequest, User};
