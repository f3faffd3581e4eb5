//! Application configuration management.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Binary store registry configuration.
    #[serde(default)]
    pub store: StoreSection,
    /// Named connection strings, referenced by cloud providers.
    #[serde(default)]
    pub connection_strings: ConnectionStrings,
}

/// Registry section: the configured providers and the default one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    /// Name of the provider used by the facade operations.
    #[serde(default)]
    pub default_provider: Option<String>,
    /// Providers in configuration order.
    #[serde(default)]
    pub providers: Vec<ProviderSettings>,
    /// Base directory for `~/` relative folder names.
    #[serde(default)]
    pub application_root: Option<PathBuf>,
}

impl StoreSection {
    /// Find provider settings by name, ignoring ASCII case.
    #[must_use]
    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Which backend implementation a provider entry configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Local directory tree with sidecar metadata.
    #[serde(alias = "filesystem", alias = "fs")]
    FileSystem,
    /// Azure Blob Storage container.
    #[serde(alias = "azure", alias = "blob")]
    AzureBlob,
}

impl ProviderKind {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FileSystem => "file_system",
            Self::AzureBlob => "azure_blob",
        }
    }
}

/// One named provider entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    /// Unique provider name.
    pub name: String,
    /// Backend implementation.
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Backend specific parameters (e.g. `folderName`, `containerName`).
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl ProviderSettings {
    /// Create provider settings without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters: HashMap::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Named secret store for connection strings.
///
/// Lookups ignore ASCII case, since environment sources lowercase their keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ConnectionStrings(HashMap<String, String>);

impl ConnectionStrings {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection string.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Resolve a connection string by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BINSTORE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Parses configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_toml(text: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = r#"
        [store]
        default_provider = "local"

        [[store.providers]]
        name = "local"
        type = "file_system"
        [store.providers.parameters]
        folderName = "~/App_Data/blobs"
        bufferSize = 4096

        [[store.providers]]
        name = "cloud"
        type = "azure_blob"
        [store.providers.parameters]
        connectionStringName = "storage"

        [connection_strings]
        storage = "UseDevelopmentStorage=true"
    "#;

    #[test]
    fn test_parse_store_section() {
        let config = AppConfig::from_toml(SAMPLE).expect("valid config");

        assert_eq!(config.store.default_provider.as_deref(), Some("local"));
        assert_eq!(config.store.providers.len(), 2);
        assert_eq!(config.store.providers[0].kind, ProviderKind::FileSystem);
        assert_eq!(config.store.providers[1].kind, ProviderKind::AzureBlob);
        assert!(config.store.application_root.is_none());
    }

    #[test]
    fn test_parameters_are_strings() {
        let config = AppConfig::from_toml(SAMPLE).expect("valid config");
        let local = config.store.provider("local").expect("local provider");

        let param = |key: &str| {
            local
                .parameters
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(param("folderName"), Some("~/App_Data/blobs"));
        assert_eq!(param("bufferSize"), Some("4096"));
    }

    #[test]
    fn test_missing_store_section_defaults() {
        let config = AppConfig::from_toml("").expect("empty config");
        assert!(config.store.default_provider.is_none());
        assert!(config.store.providers.is_empty());
    }

    #[rstest]
    #[case("storage")]
    #[case("STORAGE")]
    #[case("Storage")]
    fn test_connection_string_lookup_ignores_case(#[case] name: &str) {
        let config = AppConfig::from_toml(SAMPLE).expect("valid config");
        assert_eq!(
            config.connection_strings.get(name),
            Some("UseDevelopmentStorage=true")
        );
    }

    #[rstest]
    #[case("local")]
    #[case("LOCAL")]
    #[case("Local")]
    fn test_provider_lookup_ignores_case(#[case] name: &str) {
        let config = AppConfig::from_toml(SAMPLE).expect("valid config");
        let provider = config.store.provider(name).expect("provider");
        assert_eq!(provider.name, "local");
        assert_eq!(provider.kind, ProviderKind::FileSystem);
    }

    #[test]
    fn test_unknown_connection_string() {
        let strings = ConnectionStrings::new().with("a", "b");
        assert!(strings.get("missing").is_none());
    }

    #[test]
    fn test_unknown_provider_type_rejected() {
        let text = r#"
            [[store.providers]]
            name = "x"
            type = "ftp"
        "#;
        assert!(AppConfig::from_toml(text).is_err());
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("binstore-test-none")),
                ("BINSTORE__STORE__DEFAULT_PROVIDER", Some("local")),
            ],
            || {
                let config = AppConfig::load().expect("config from env");
                assert_eq!(config.store.default_provider.as_deref(), Some("local"));
            },
        );
    }
}
