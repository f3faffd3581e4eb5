//! Azure storage connection string parsing.

use std::fmt;

use crate::error::{StoreError, StoreResult};

/// Account name of the local storage emulator.
pub const DEVELOPMENT_ACCOUNT: &str = "devstoreaccount1";
/// Published key of the local storage emulator.
pub const DEVELOPMENT_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
/// Blob endpoint of the local storage emulator.
pub const DEVELOPMENT_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// How requests to the account are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Base64 account key, used for SharedKey signing.
    SharedKey(String),
    /// Shared access signature query string, without the leading `?`.
    Sas(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedKey(_) => f.write_str("SharedKey(***)"),
            Self::Sas(_) => f.write_str("Sas(***)"),
        }
    }
}

/// A storage account resolved from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAccount {
    /// Account name, absent for SAS-only strings with an explicit endpoint.
    pub account_name: Option<String>,
    /// Blob service endpoint, without a trailing slash.
    pub blob_endpoint: String,
    /// Request authorization.
    pub credential: Credential,
}

impl StorageAccount {
    /// The local storage emulator account.
    #[must_use]
    pub fn development() -> Self {
        Self {
            account_name: Some(DEVELOPMENT_ACCOUNT.to_string()),
            blob_endpoint: DEVELOPMENT_BLOB_ENDPOINT.to_string(),
            credential: Credential::SharedKey(DEVELOPMENT_ACCOUNT_KEY.to_string()),
        }
    }

    /// Parse a `Key=Value;Key=Value` connection string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the string is malformed, lacks a
    /// credential, or does not identify a blob endpoint.
    pub fn parse(connection_string: &str) -> StoreResult<Self> {
        let mut fields = Fields::default();

        for pair in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(invalid)?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "usedevelopmentstorage" => fields.development = value.eq_ignore_ascii_case("true"),
                "defaultendpointsprotocol" => fields.protocol = Some(value),
                "accountname" => fields.account_name = Some(value),
                "accountkey" => fields.account_key = Some(value),
                "blobendpoint" => fields.blob_endpoint = Some(value),
                "endpointsuffix" => fields.endpoint_suffix = Some(value),
                "sharedaccesssignature" => fields.sas = Some(value),
                // Endpoints of the other storage services are irrelevant here.
                "queueendpoint" | "tableendpoint" | "fileendpoint" | "developmentstorageproxyuri" => {}
                _ => return Err(invalid()),
            }
        }

        if fields.development {
            return Ok(Self::development());
        }

        let credential = match (fields.account_key, fields.sas) {
            (Some(key), _) if !key.is_empty() => Credential::SharedKey(key),
            (_, Some(sas)) if !sas.is_empty() => {
                Credential::Sas(sas.trim_start_matches('?').to_string())
            }
            _ => return Err(invalid()),
        };

        let account_name = fields.account_name.filter(|name| !name.is_empty());
        let blob_endpoint = match (fields.blob_endpoint, &account_name) {
            (Some(endpoint), _) if !endpoint.is_empty() => endpoint.trim_end_matches('/').to_string(),
            (_, Some(account)) => format!(
                "{}://{}.blob.{}",
                fields.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
                account,
                fields
                    .endpoint_suffix
                    .as_deref()
                    .unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
            ),
            _ => return Err(invalid()),
        };

        if matches!(credential, Credential::SharedKey(_)) && account_name.is_none() {
            return Err(invalid());
        }

        Ok(Self {
            account_name,
            blob_endpoint,
            credential,
        })
    }
}

#[derive(Default)]
struct Fields {
    development: bool,
    protocol: Option<String>,
    account_name: Option<String>,
    account_key: Option<String>,
    blob_endpoint: Option<String>,
    endpoint_suffix: Option<String>,
    sas: Option<String>,
}

fn invalid() -> StoreError {
    StoreError::configuration("Invalid storage connection string")
}
