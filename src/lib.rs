// Server configuration (TOML file + env overrides)
pub mod config;

// In-memory entity registries
pub mod registry;

// HTTP API
pub mod api;
