//! Repositories for database operations
//!
//! Every repository is a cheap clone over the shared `PgPool`. Multi-row
//! writes (sale creation, the managing-director invariant checks) run inside
//! transactions; everything else is a single statement.

pub mod catalog;
pub mod contact;
pub mod inventory;
pub mod media;
pub mod page;
pub mod sale;
pub mod user;

pub use catalog::CatalogRepository;
pub use contact::ContactRepository;
pub use inventory::InventoryRepository;
pub use media::MediaRepository;
pub use page::PageRepository;
pub use sale::SaleRepository;
pub use user::UserRepository;
