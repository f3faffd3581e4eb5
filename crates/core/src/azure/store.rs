//! Azure blob store implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::{debug, info, warn};

use super::config::{AzureBlobConfig, validate_container_name, validate_default_content_type};
use super::connection::{Credential, StorageAccount};
use super::container::ContainerProvisioner;
use crate::error::{StoreError, StoreResult};
use crate::store::{BlobStore, StoredObject};
use crate::validation::{effective_content_type, ensure_content_type, ensure_name};

/// Blob store over one Azure storage container.
///
/// Object names map one to one onto blob names; the content type is the
/// blob's `Content-Type` property.
#[derive(Debug)]
pub struct AzureBlobStore {
    operator: Operator,
    container: String,
    default_content_type: String,
    provisioner: Option<ContainerProvisioner>,
}

impl AzureBlobStore {
    /// Create a store from configuration.
    ///
    /// The container is created on first use if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid connection string,
    /// container name or default content type.
    pub fn new(config: AzureBlobConfig) -> StoreResult<Self> {
        config.validate()?;
        let account = StorageAccount::parse(&config.connection_string)?;
        let operator = Self::create_operator(&account, &config.container)?;
        let provisioner = ContainerProvisioner::new(account.clone(), config.container.clone())?;

        info!(
            endpoint = %account.blob_endpoint,
            container = %config.container,
            default_content_type = %config.default_content_type,
            "Azure blob store configured"
        );

        Ok(Self {
            operator,
            container: config.container,
            default_content_type: config.default_content_type,
            provisioner: Some(provisioner),
        })
    }

    /// Create a store over an existing operator.
    ///
    /// No container provisioning is done; the operator must already point at
    /// a usable container.
    pub fn with_operator(
        operator: Operator,
        container: impl Into<String>,
        default_content_type: impl Into<String>,
    ) -> StoreResult<Self> {
        let container = container.into();
        let default_content_type = default_content_type.into();
        validate_container_name(&container)?;
        validate_default_content_type(&default_content_type)?;

        Ok(Self {
            operator,
            container,
            default_content_type,
            provisioner: None,
        })
    }

    /// Create OpenDAL operator for the account and container.
    fn create_operator(account: &StorageAccount, container: &str) -> StoreResult<Operator> {
        let mut builder = services::Azblob::default()
            .endpoint(&account.blob_endpoint)
            .container(container);

        if let Some(name) = &account.account_name {
            builder = builder.account_name(name);
        }
        builder = match &account.credential {
            Credential::SharedKey(key) => builder.account_key(key),
            Credential::Sas(token) => builder.sas_token(token),
        };

        Ok(Operator::new(builder)
            .map_err(|e| StoreError::configuration(e.to_string()))?
            .finish())
    }

    /// Container name.
    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Content type used when none is stored.
    #[must_use]
    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    async fn ready(&self) -> StoreResult<()> {
        match &self.provisioner {
            Some(provisioner) => provisioner.ensure().await,
            None => Ok(()),
        }
    }
}

impl BlobStore for AzureBlobStore {
    async fn exists(&self, name: &str) -> StoreResult<bool> {
        ensure_name(name)?;
        self.ready().await?;

        match self.operator.stat(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        ensure_name(name)?;
        self.ready().await?;

        // The service delete is idempotent, presence has to be checked first.
        match self.operator.stat(name).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(name, container = %self.container, "Delete skipped, blob not found");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        self.operator.delete(name).await?;

        debug!(name, container = %self.container, "Blob deleted");
        Ok(true)
    }

    async fn load(&self, name: &str) -> StoreResult<Option<StoredObject>> {
        ensure_name(name)?;
        self.ready().await?;

        let meta = match self.operator.stat(name).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content = match self.operator.read(name).await {
            Ok(buffer) => buffer.to_bytes(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content_type = meta
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(self.default_content_type.as_str())
            .to_string();

        debug!(name, size = content.len(), %content_type, "Blob loaded");
        Ok(Some(StoredObject {
            content,
            content_type,
        }))
    }

    async fn save(&self, name: &str, content: Bytes, content_type: Option<&str>) -> StoreResult<()> {
        ensure_name(name)?;
        ensure_content_type(content_type)?;
        self.ready().await?;

        let content_type = effective_content_type(content_type, &self.default_content_type);
        let size = content.len();
        if self.operator.info().full_capability().write_with_content_type {
            self.operator
                .write_with(name, content)
                .content_type(content_type)
                .await?;
        } else {
            warn!(name, "Operator cannot store content types, default applies on load");
            self.operator.write(name, content).await?;
        }

        debug!(name, size, content_type, container = %self.container, "Blob saved");
        Ok(())
    }
}
