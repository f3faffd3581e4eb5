//! Core of the binary store.
//!
//! Callers save, load, check and delete named binary objects without knowing
//! which backend holds them.
//!
//! # Modules
//!
//! - `validation` - Object name and content-type rules shared by all backends
//! - `store` - The `BlobStore` capability contract
//! - `filesystem` - Local directory backend with sidecar content types
//! - `azure` - Azure Blob Storage backend (OpenDAL)
//! - `registry` - Configured providers and the default-provider facade
//!
//! # Example
//!
//! ```rust,ignore
//! use binstore_core::{BlobStore, StoreRegistry};
//! use binstore_shared::AppConfig;
//!
//! let registry = StoreRegistry::from_config(&AppConfig::load()?)?;
//! registry.save("docs/readme.txt", "hello".into(), Some("text/plain")).await?;
//! let object = registry.load("docs/readme.txt").await?.expect("saved above");
//! assert_eq!(object.content_type, "text/plain");
//! ```

pub mod azure;
pub mod error;
pub mod filesystem;
pub mod parameters;
pub mod registry;
pub mod store;
pub mod validation;

pub use azure::{AzureBlobConfig, AzureBlobStore};
pub use error::{StoreError, StoreResult};
pub use filesystem::{FileSystemConfig, FileSystemStore};
pub use registry::{Provider, StoreRegistry};
pub use store::{BlobStore, StoredObject};
pub use validation::{validate_content_type, validate_name};
