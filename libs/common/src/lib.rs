//! Common library for the Terrasol back office
//!
//! This crate provides shared infrastructure used by the Terrasol services:
//! PostgreSQL connection pooling, the Redis cache wrapper, and shared
//! database error types.

pub mod cache;
pub mod database;
pub mod error;
