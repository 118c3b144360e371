// Infrastructure layer (shared components)
pub mod config;
pub mod error;
pub mod metrics;

// External service boundaries
pub mod push;
pub mod store;

// Domain layer (business logic)
pub mod broadcast;
pub mod directory;
pub mod geo;
pub mod notification;

// Application layer
pub mod api;
pub mod server;
