//! Local filesystem backend.
//!
//! Objects live under a root directory; `/`-separated names become nested
//! directories. The content type of each object is kept in a sidecar file next
//! to the content:
//!
//! ```text
//! <root>/a/b/file.ext          content
//! <root>/a/b/file.ext.$type    content type (raw text)
//! ```
//!
//! `$` is not allowed in object names, so sidecars never collide with objects.

mod config;
mod store;

pub use config::FileSystemConfig;
pub use store::{FileSystemStore, SIDECAR_SUFFIX};
