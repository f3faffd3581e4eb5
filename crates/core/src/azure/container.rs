//! Create-if-not-exists provisioning of the blob container.
//!
//! OpenDAL addresses blobs inside an existing container only, so the container
//! itself is created with a single `Create Container` REST call.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::{StatusCode, Url};
use sha2::Sha256;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::connection::{Credential, StorageAccount};
use crate::error::{StoreError, StoreResult};

/// Blob service REST API version sent with provisioning requests.
pub const API_VERSION: &str = "2021-08-06";

const ERROR_CODE_HEADER: &str = "x-ms-error-code";
const CONTAINER_EXISTS: &str = "ContainerAlreadyExists";

/// Creates the container once per store instance, on first use.
#[derive(Debug)]
pub(crate) struct ContainerProvisioner {
    client: reqwest::Client,
    account: StorageAccount,
    container: String,
    ready: OnceCell<()>,
}

impl ContainerProvisioner {
    pub(crate) fn new(account: StorageAccount, container: String) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::configuration(e.to_string()))?;

        Ok(Self::with_client(client, account, container))
    }

    pub(crate) fn with_client(
        client: reqwest::Client,
        account: StorageAccount,
        container: String,
    ) -> Self {
        Self {
            client,
            account,
            container,
            ready: OnceCell::new(),
        }
    }

    /// Make sure the container exists. Only the first successful call talks to
    /// the service; failures are retried by the next caller.
    pub(crate) async fn ensure(&self) -> StoreResult<()> {
        self.ready
            .get_or_try_init(|| self.create_if_not_exists())
            .await
            .map(|_| ())
    }

    fn container_url(&self) -> StoreResult<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.account.blob_endpoint, self.container))
            .map_err(|e| StoreError::configuration(format!("invalid blob endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("restype", "container");
        Ok(url)
    }

    async fn create_if_not_exists(&self) -> StoreResult<()> {
        let mut url = self.container_url()?;

        let mut request = match &self.account.credential {
            Credential::SharedKey(key) => {
                let account = self.account.account_name.as_deref().unwrap_or_default();
                let date = chrono::Utc::now()
                    .format("%a, %d %b %Y %H:%M:%S GMT")
                    .to_string();
                let signature = sign(key, &string_to_sign("PUT", account, &url, &date))?;

                self.client
                    .put(url)
                    .header("x-ms-date", date)
                    .header(
                        reqwest::header::AUTHORIZATION,
                        format!("SharedKey {account}:{signature}"),
                    )
            }
            Credential::Sas(token) => {
                let query = format!("{}&{token}", url.query().unwrap_or_default());
                url.set_query(Some(&query));
                self.client.put(url)
            }
        };
        request = request
            .header("x-ms-version", API_VERSION)
            .header(reqwest::header::CONTENT_LENGTH, 0);

        let response = request.send().await?;
        let status = response.status();
        let error_code = response
            .headers()
            .get(ERROR_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        match status {
            StatusCode::CREATED => {
                info!(container = %self.container, "Blob container created");
                Ok(())
            }
            StatusCode::CONFLICT if error_code == CONTAINER_EXISTS => {
                debug!(container = %self.container, "Blob container already exists");
                Ok(())
            }
            // Container scoped SAS tokens cannot create containers.
            StatusCode::FORBIDDEN if matches!(self.account.credential, Credential::Sas(_)) => {
                warn!(
                    container = %self.container,
                    "SAS token may not create containers, assuming the container exists"
                );
                Ok(())
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::backend(format!(
                    "failed to create container '{}': HTTP {status} {error_code} {body}",
                    self.container
                )))
            }
        }
    }
}

/// SharedKey string-to-sign for a body-less request with `x-ms-date` and
/// `x-ms-version` as the only `x-ms-*` headers.
pub(crate) fn string_to_sign(verb: &str, account: &str, url: &Url, date: &str) -> String {
    // Content-Encoding .. Range: eleven standard headers, all empty here.
    let standard_headers = "\n".repeat(11);

    let mut resource = format!("/{account}{}", url.path());
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in url.query_pairs() {
        params
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into_owned());
    }
    for (name, mut values) in params {
        values.sort();
        resource.push_str(&format!("\n{name}:{}", values.join(",")));
    }

    format!("{verb}\n{standard_headers}x-ms-date:{date}\nx-ms-version:{API_VERSION}\n{resource}")
}

/// Base64 HMAC-SHA256 of `string_to_sign` keyed with the decoded account key.
pub(crate) fn sign(account_key: &str, string_to_sign: &str) -> StoreResult<String> {
    let key = STANDARD
        .decode(account_key)
        .map_err(|_| StoreError::configuration("Invalid storage account key"))?;
    let mut mac = Hmac::<Sha256>::new_from_slice(&key)
        .map_err(|_| StoreError::configuration("Invalid storage account key"))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
