//! Consumable provider parameters.

use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};

/// Provider parameters consumed key by key during backend construction.
///
/// Keys match ignoring ASCII case. Whatever remains after a backend took the
/// keys it understands is reported by [`ProviderParameters::finish`].
#[derive(Debug, Default)]
pub struct ProviderParameters {
    entries: HashMap<String, String>,
}

impl ProviderParameters {
    /// Wrap raw parameters.
    #[must_use]
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Remove and return a value.
    pub fn take(&mut self, key: &str) -> Option<String> {
        let found = self
            .entries
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .cloned()?;
        self.entries.remove(&found)
    }

    /// Remove a value, falling back to `default` when absent.
    pub fn take_or(&mut self, key: &str, default: &str) -> String {
        self.take(key).unwrap_or_else(|| default.to_string())
    }

    /// Remove and parse a value, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the value does not parse.
    pub fn take_parsed_or<T>(&mut self, key: &str, default: T) -> StoreResult<T>
    where
        T: std::str::FromStr,
    {
        match self.take(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                StoreError::configuration(format!("Invalid value '{raw}' for \"{key}\"."))
            }),
        }
    }

    /// Fail if any parameter was not consumed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing the leftover keys.
    pub fn finish(self) -> StoreResult<()> {
        if self.entries.is_empty() {
            return Ok(());
        }

        let mut keys: Vec<_> = self.entries.into_keys().collect();
        keys.sort();
        Err(StoreError::configuration(format!(
            "Unrecognized configuration attributes found: {}",
            keys.join(", ")
        )))
    }
}

impl From<HashMap<String, String>> for ProviderParameters {
    fn from(entries: HashMap<String, String>) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ProviderParameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    #[test]
    fn test_take_ignores_case() {
        let mut p = params(&[("ContainerName", "files")]);
        assert_eq!(p.take("containerName").as_deref(), Some("files"));
        assert!(p.take("containerName").is_none());
        assert!(p.finish().is_ok());
    }

    #[test]
    fn test_take_parsed_or() {
        let mut p = params(&[("bufferSize", " 1024 ")]);
        assert_eq!(p.take_parsed_or("bufferSize", 65536_i64).ok(), Some(1024));
        assert_eq!(p.take_parsed_or("bufferSize", 65536_i64).ok(), Some(65536));

        let mut p = params(&[("bufferSize", "lots")]);
        assert!(matches!(
            p.take_parsed_or("bufferSize", 1_i64),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_finish_reports_leftovers() {
        let p = params(&[("zeta", "1"), ("alpha", "2")]);
        let err = p.finish().unwrap_err();
        assert_eq!(
            err.to_string(),
            "store configuration error: Unrecognized configuration attributes found: alpha, zeta"
        );
    }
}
