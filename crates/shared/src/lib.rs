//! Shared configuration for the binary store.
//!
//! This crate provides the configuration model read at process startup:
//! - The registry section (default provider name, ordered provider list)
//! - Per-provider settings with free-form parameters
//! - Named connection strings used to resolve cloud credentials

pub mod config;

pub use config::{AppConfig, ConnectionStrings, ProviderKind, ProviderSettings, StoreSection};
