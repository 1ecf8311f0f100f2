// Socialite - social networking REST backend

// Authentication - password hashing, token minting, request extractors
pub mod auth;

// Relationship & authorization engine - permission rules, notification
// fan-out, and derived view fields
pub mod engine;

// Repository layer over the relational store
pub mod store;

// HTTP surface
pub mod routes;

// Common utilities
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;

// Re-exports for convenience
pub use error::{AppError, AppResult};
