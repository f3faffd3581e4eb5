//! Azure Blob Storage backend.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ AzureBlobStore                                               │
//! ├──────────────────────────────┬───────────────────────────────┤
//! │ ContainerProvisioner         │ OpenDAL Operator (azblob)     │
//! │ PUT ?restype=container, once │ stat / read / write / delete  │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```
//!
//! A `NotFound` from the service is turned into `Ok(None)` / `Ok(false)` here
//! and never reaches callers as an error.

mod config;
mod connection;
mod container;
mod store;

pub use config::AzureBlobConfig;
pub use connection::{Credential, StorageAccount};
pub use store::AzureBlobStore;
