//! The capability contract every backend implements.

use std::future::Future;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{StoreError, StoreResult};

/// A loaded object: its full content and content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body.
    pub content: Bytes,
    /// Stored content type, or the backend default if none was recorded.
    pub content_type: String,
}

/// Named binary object storage.
///
/// Implementations validate names and content types with
/// [`crate::validation`] before any physical access, and report a missing
/// object as `Ok(None)` / `Ok(false)` rather than an error. Operations on
/// different names are independent; nothing is serialized per name.
pub trait BlobStore: Send + Sync {
    /// Check whether an object exists.
    fn exists(&self, name: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Delete an object and any metadata kept for it.
    ///
    /// Returns `false` if nothing was stored under `name`.
    fn delete(&self, name: &str) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Load an object, `None` if it does not exist.
    fn load(&self, name: &str) -> impl Future<Output = StoreResult<Option<StoredObject>>> + Send;

    /// Create or fully replace an object.
    ///
    /// A `None` or empty `content_type` stores the backend default.
    fn save(
        &self,
        name: &str,
        content: Bytes,
        content_type: Option<&str>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Save the whole content of `reader`.
    ///
    /// Fails with `StoreError::Argument` if the reader cannot be read.
    fn save_reader<R>(
        &self,
        name: &str,
        reader: R,
        content_type: Option<&str>,
    ) -> impl Future<Output = StoreResult<()>> + Send
    where
        R: AsyncRead + Unpin + Send,
    {
        async move {
            crate::validation::ensure_name(name)?;
            crate::validation::ensure_content_type(content_type)?;
            let content = read_all(reader).await?;
            self.save(name, content, content_type).await
        }
    }

    /// Write an object's content into `writer`.
    ///
    /// Returns the content type, or `None` if the object does not exist.
    fn load_to_writer<W>(
        &self,
        name: &str,
        mut writer: W,
    ) -> impl Future<Output = StoreResult<Option<String>>> + Send
    where
        W: AsyncWrite + Unpin + Send,
    {
        async move {
            let Some(object) = self.load(name).await? else {
                return Ok(None);
            };
            writer.write_all(&object.content).await?;
            writer.flush().await?;
            Ok(Some(object.content_type))
        }
    }
}

/// Drain a caller supplied reader into memory.
pub(crate) async fn read_all<R>(mut reader: R) -> StoreResult<Bytes>
where
    R: AsyncRead + Unpin + Send,
{
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|e| StoreError::argument(format!("the stream does not support reading: {e}")))?;
    Ok(Bytes::from(buf))
}
