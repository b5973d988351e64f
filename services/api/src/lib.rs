//! Terrasol API service
//!
//! The application proper: authorization guard, RBAC permission model,
//! catalog, inventory ledger, sale transaction coordinator, and the admin
//! and public surfaces around them.

pub mod error;
pub mod guard;
pub mod middleware;
pub mod models;
pub mod rbac;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
