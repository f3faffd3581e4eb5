//! Provider registry and facade.
//!
//! The registry is built once at startup from configuration, owns every
//! configured backend, and is read-only afterwards. Its own `BlobStore`
//! implementation delegates to the default provider.

use std::path::{Path, PathBuf};

use binstore_shared::{AppConfig, ConnectionStrings, ProviderKind, ProviderSettings, StoreSection};
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use crate::azure::{AzureBlobConfig, AzureBlobStore};
use crate::error::{StoreError, StoreResult};
use crate::filesystem::{FileSystemConfig, FileSystemStore};
use crate::parameters::ProviderParameters;
use crate::store::{BlobStore, StoredObject};

/// One configured backend.
#[derive(Debug)]
pub enum Provider {
    /// Local directory tree.
    FileSystem(FileSystemStore),
    /// Azure blob container.
    AzureBlob(AzureBlobStore),
}

impl Provider {
    /// Construct a backend from its settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are incomplete, contain
    /// unknown keys, or reference an unknown connection string.
    pub fn from_settings(
        settings: &ProviderSettings,
        application_root: &Path,
        connection_strings: &ConnectionStrings,
    ) -> StoreResult<Self> {
        let params = ProviderParameters::new(settings.parameters.clone());
        let provider = match settings.kind {
            ProviderKind::FileSystem => FileSystemConfig::from_parameters(params, application_root)
                .and_then(FileSystemStore::new)
                .map(Self::FileSystem),
            ProviderKind::AzureBlob => AzureBlobConfig::from_parameters(params, connection_strings)
                .and_then(AzureBlobStore::new)
                .map(Self::AzureBlob),
        };

        provider.map_err(|e| match e {
            StoreError::Configuration(msg) => {
                StoreError::configuration(format!("provider '{}': {msg}", settings.name))
            }
            other => other,
        })
    }

    /// Backend kind.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::FileSystem(_) => ProviderKind::FileSystem,
            Self::AzureBlob(_) => ProviderKind::AzureBlob,
        }
    }

    /// Content type stored when callers supply none.
    #[must_use]
    pub fn default_content_type(&self) -> &str {
        match self {
            Self::FileSystem(store) => store.default_content_type(),
            Self::AzureBlob(store) => store.default_content_type(),
        }
    }
}

impl BlobStore for Provider {
    async fn exists(&self, name: &str) -> StoreResult<bool> {
        match self {
            Self::FileSystem(store) => store.exists(name).await,
            Self::AzureBlob(store) => store.exists(name).await,
        }
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        match self {
            Self::FileSystem(store) => store.delete(name).await,
            Self::AzureBlob(store) => store.delete(name).await,
        }
    }

    async fn load(&self, name: &str) -> StoreResult<Option<StoredObject>> {
        match self {
            Self::FileSystem(store) => store.load(name).await,
            Self::AzureBlob(store) => store.load(name).await,
        }
    }

    async fn save(&self, name: &str, content: Bytes, content_type: Option<&str>) -> StoreResult<()> {
        match self {
            Self::FileSystem(store) => store.save(name, content, content_type).await,
            Self::AzureBlob(store) => store.save(name, content, content_type).await,
        }
    }

    async fn save_reader<R>(&self, name: &str, reader: R, content_type: Option<&str>) -> StoreResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        match self {
            Self::FileSystem(store) => store.save_reader(name, reader, content_type).await,
            Self::AzureBlob(store) => store.save_reader(name, reader, content_type).await,
        }
    }

    async fn load_to_writer<W>(&self, name: &str, writer: W) -> StoreResult<Option<String>>
    where
        W: AsyncWrite + Unpin + Send,
    {
        match self {
            Self::FileSystem(store) => store.load_to_writer(name, writer).await,
            Self::AzureBlob(store) => store.load_to_writer(name, writer).await,
        }
    }
}

/// Immutable name → provider mapping with a designated default.
#[derive(Debug)]
pub struct StoreRegistry {
    providers: Vec<(String, Provider)>,
    default_index: usize,
}

impl StoreRegistry {
    /// Build the registry from application configuration.
    ///
    /// # Errors
    ///
    /// See [`StoreRegistry::from_section`].
    pub fn from_config(config: &AppConfig) -> StoreResult<Self> {
        Self::from_section(&config.store, &config.connection_strings)
    }

    /// Build the registry from the store section.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if no provider is configured, no
    /// default is named, or the default does not match a provider, and
    /// `StoreError::Configuration` if a provider cannot be constructed.
    pub fn from_section(
        section: &StoreSection,
        connection_strings: &ConnectionStrings,
    ) -> StoreResult<Self> {
        if section.providers.is_empty() {
            return Err(StoreError::unavailable("No Store providers specified."));
        }
        let default = require_default(section.default_provider.as_deref())?;
        if section.provider(default).is_none() {
            return Err(StoreError::unavailable(
                "Default Store provider was not found.",
            ));
        }

        let application_root = match &section.application_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        let providers = section
            .providers
            .iter()
            .map(|settings| {
                Provider::from_settings(settings, &application_root, connection_strings)
                    .map(|provider| (settings.name.clone(), provider))
            })
            .collect::<StoreResult<Vec<_>>>()?;

        Self::from_providers(providers, default)
    }

    /// Build the registry from already constructed providers.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` for an empty list or an unknown
    /// default, and `StoreError::Configuration` for duplicate names.
    pub fn from_providers(providers: Vec<(String, Provider)>, default: &str) -> StoreResult<Self> {
        if providers.is_empty() {
            return Err(StoreError::unavailable("No Store providers specified."));
        }
        let default = require_default(Some(default))?;

        for (i, (name, _)) in providers.iter().enumerate() {
            if providers[..i].iter().any(|(other, _)| other.eq_ignore_ascii_case(name)) {
                return Err(StoreError::configuration(format!(
                    "Duplicate Store provider name '{name}'."
                )));
            }
        }

        let default_index = providers
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(default))
            .ok_or_else(|| StoreError::unavailable("Default Store provider was not found."))?;

        info!(
            providers = providers.len(),
            default = %providers[default_index].0,
            kind = providers[default_index].1.kind().name(),
            "Store registry initialized"
        );

        Ok(Self {
            providers,
            default_index,
        })
    }

    /// Name of the default provider.
    #[must_use]
    pub fn default_name(&self) -> &str {
        &self.providers[self.default_index].0
    }

    /// The default provider.
    #[must_use]
    pub fn default_provider(&self) -> &Provider {
        &self.providers[self.default_index].1
    }

    /// Look up a provider by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, provider)| provider)
    }

    /// Provider names in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|(name, _)| name.as_str())
    }

    /// Number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always `false`: a registry holds at least one provider.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl BlobStore for StoreRegistry {
    async fn exists(&self, name: &str) -> StoreResult<bool> {
        self.default_provider().exists(name).await
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        self.default_provider().delete(name).await
    }

    async fn load(&self, name: &str) -> StoreResult<Option<StoredObject>> {
        self.default_provider().load(name).await
    }

    async fn save(&self, name: &str, content: Bytes, content_type: Option<&str>) -> StoreResult<()> {
        self.default_provider().save(name, content, content_type).await
    }

    async fn save_reader<R>(&self, name: &str, reader: R, content_type: Option<&str>) -> StoreResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.default_provider()
            .save_reader(name, reader, content_type)
            .await
    }

    async fn load_to_writer<W>(&self, name: &str, writer: W) -> StoreResult<Option<String>>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.default_provider().load_to_writer(name, writer).await
    }
}

fn require_default(name: Option<&str>) -> StoreResult<&str> {
    name.filter(|n| !n.trim().is_empty())
        .ok_or_else(|| StoreError::unavailable("No default Store provider specified."))
}
