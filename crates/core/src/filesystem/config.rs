//! Filesystem backend configuration.

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::parameters::ProviderParameters;

/// Prefix marking a folder name relative to the application root.
pub const APP_RELATIVE_PREFIX: &str = "~/";

/// Filesystem backend configuration.
#[derive(Debug, Clone)]
pub struct FileSystemConfig {
    /// Physical root directory.
    pub root: PathBuf,
    /// Copy buffer size in bytes, must be positive.
    pub buffer_size: i64,
    /// Content type stored when the caller supplies none.
    pub default_content_type: String,
}

impl FileSystemConfig {
    /// Default copy buffer size: 64KB.
    pub const DEFAULT_BUFFER_SIZE: i64 = 65536;
    /// Default content type.
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/octet-stream";

    /// Create a config rooted at `root` with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            default_content_type: Self::DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Set copy buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: i64) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set default content type.
    #[must_use]
    pub fn with_default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Build from provider parameters.
    ///
    /// Recognized keys: `folderName` (required), `bufferSize`, `defaultContentType`.
    /// A `folderName` starting with `~/` is resolved against `application_root`.
    pub fn from_parameters(
        mut params: ProviderParameters,
        application_root: &Path,
    ) -> StoreResult<Self> {
        let folder_name = params.take("folderName").unwrap_or_default();
        let root = resolve_folder(&folder_name, application_root)?;
        let default_content_type =
            params.take_or("defaultContentType", Self::DEFAULT_CONTENT_TYPE);
        let buffer_size = params.take_parsed_or("bufferSize", Self::DEFAULT_BUFFER_SIZE)?;
        params.finish()?;

        Ok(Self {
            root,
            buffer_size,
            default_content_type,
        })
    }

    /// Check settings, returning the buffer size as `usize`.
    pub(crate) fn validate(&self) -> StoreResult<usize> {
        if self.default_content_type.trim().is_empty() {
            return Err(StoreError::configuration("Invalid default content type."));
        }
        usize::try_from(self.buffer_size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| StoreError::configuration("Buffer size must be positive integer."))
    }
}

fn resolve_folder(folder_name: &str, application_root: &Path) -> StoreResult<PathBuf> {
    if folder_name.trim().is_empty() {
        return Err(StoreError::configuration(
            "Required attribute \"folderName\" not set.",
        ));
    }

    match folder_name.strip_prefix(APP_RELATIVE_PREFIX) {
        Some(relative) => Ok(application_root.join(relative)),
        None => Ok(PathBuf::from(folder_name)),
    }
}
