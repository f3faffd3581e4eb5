//! Azure blob backend configuration.

use std::fmt;

use binstore_shared::ConnectionStrings;

use crate::error::{StoreError, StoreResult};
use crate::parameters::ProviderParameters;

/// Azure blob backend configuration.
#[derive(Clone)]
pub struct AzureBlobConfig {
    /// Resolved connection string.
    pub connection_string: String,
    /// Container holding the objects.
    pub container: String,
    /// Content type stored when the caller supplies none.
    pub default_content_type: String,
}

impl fmt::Debug for AzureBlobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureBlobConfig")
            .field("connection_string", &"***")
            .field("container", &self.container)
            .field("default_content_type", &self.default_content_type)
            .finish()
    }
}

impl AzureBlobConfig {
    /// Default container name.
    pub const DEFAULT_CONTAINER: &'static str = "blob-store-provider";
    /// Default content type.
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/octet-stream";

    /// Create a config for a connection string with default settings.
    #[must_use]
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            container: Self::DEFAULT_CONTAINER.to_string(),
            default_content_type: Self::DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Set container name.
    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
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
    /// Recognized keys: `connectionStringName` (required, resolved against
    /// `connection_strings`), `containerName`, `defaultContentType`.
    pub fn from_parameters(
        mut params: ProviderParameters,
        connection_strings: &ConnectionStrings,
    ) -> StoreResult<Self> {
        let connection_string_name = params
            .take("connectionStringName")
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                StoreError::configuration("Connection string name cannot be null or empty.")
            })?;
        let connection_string = connection_strings
            .get(&connection_string_name)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| StoreError::configuration("Connection string cannot be blank."))?
            .to_string();
        let container = params.take_or("containerName", Self::DEFAULT_CONTAINER);
        let default_content_type =
            params.take_or("defaultContentType", Self::DEFAULT_CONTENT_TYPE);
        params.finish()?;

        Ok(Self {
            connection_string,
            container,
            default_content_type,
        })
    }

    /// Check container name and default content type.
    pub(crate) fn validate(&self) -> StoreResult<()> {
        validate_container_name(&self.container)?;
        validate_default_content_type(&self.default_content_type)
    }
}

pub(crate) fn validate_default_content_type(content_type: &str) -> StoreResult<()> {
    if content_type.trim().is_empty() {
        return Err(StoreError::configuration("Invalid default content type"));
    }
    Ok(())
}

/// Container names: 3-63 chars of lowercase letters, digits and single
/// dashes, starting and ending with a letter or digit.
pub(crate) fn validate_container_name(name: &str) -> StoreResult<()> {
    let valid = (3..=63).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--");

    if valid {
        Ok(())
    } else {
        Err(StoreError::configuration(format!(
            "Invalid container name '{name}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> ProviderParameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    fn strings() -> ConnectionStrings {
        ConnectionStrings::new()
            .with("storage", "UseDevelopmentStorage=true")
            .with("blank", "   ")
    }

    #[test]
    fn test_defaults() {
        let config =
            AzureBlobConfig::from_parameters(params(&[("connectionStringName", "storage")]), &strings())
                .expect("valid");

        assert_eq!(config.connection_string, "UseDevelopmentStorage=true");
        assert_eq!(config.container, AzureBlobConfig::DEFAULT_CONTAINER);
        assert_eq!(
            config.default_content_type,
            AzureBlobConfig::DEFAULT_CONTENT_TYPE
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_container_name_key_ignores_case() {
        let config = AzureBlobConfig::from_parameters(
            params(&[("connectionStringName", "storage"), ("ContainerName", "files")]),
            &strings(),
        )
        .expect("valid");
        assert_eq!(config.container, "files");
    }

    #[rstest]
    #[case(&[])]
    #[case(&[("connectionStringName", " ")])]
    #[case(&[("connectionStringName", "missing")])]
    #[case(&[("connectionStringName", "blank")])]
    #[case(&[("connectionStringName", "storage"), ("bufferSize", "10")])]
    fn test_invalid_parameters(#[case] pairs: &[(&str, &str)]) {
        let err = AzureBlobConfig::from_parameters(params(pairs), &strings()).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[rstest]
    #[case("blob-store-provider")]
    #[case("abc")]
    #[case("files2026")]
    fn test_valid_container_names(#[case] name: &str) {
        assert!(validate_container_name(name).is_ok());
    }

    #[rstest]
    #[case("ab")]
    #[case("Files")]
    #[case("-files")]
    #[case("files-")]
    #[case("my--files")]
    #[case("my_files")]
    fn test_invalid_container_names(#[case] name: &str) {
        assert!(validate_container_name(name).is_err());
    }

    #[test]
    fn test_debug_hides_connection_string() {
        let config = AzureBlobConfig::new("AccountName=a;AccountKey=topsecret");
        assert!(!format!("{config:?}").contains("topsecret"));
    }
}
