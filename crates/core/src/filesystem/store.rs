//! Filesystem store implementation.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use super::config::FileSystemConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::{BlobStore, StoredObject};
use crate::validation::{effective_content_type, ensure_content_type, ensure_name, segments};

/// Suffix of the content-type sidecar file.
pub const SIDECAR_SUFFIX: &str = ".$type";

/// Suffix of the temporary files a streamed save writes before renaming.
const PARTIAL_SUFFIX: &str = ".$partial";

/// Blob store over a local directory tree.
#[derive(Debug)]
pub struct FileSystemStore {
    root: PathBuf,
    buffer_size: usize,
    default_content_type: String,
}

impl FileSystemStore {
    /// Create the store, creating the root directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a non-positive buffer size or blank
    /// default content type, and an I/O error if the root cannot be created.
    pub fn new(config: FileSystemConfig) -> StoreResult<Self> {
        let buffer_size = config.validate()?;
        std::fs::create_dir_all(&config.root)?;

        info!(
            root = %config.root.display(),
            buffer_size,
            default_content_type = %config.default_content_type,
            "Filesystem store configured"
        );

        Ok(Self {
            root: config.root,
            buffer_size,
            default_content_type: config.default_content_type,
        })
    }

    /// Physical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Content type used when none is stored.
    #[must_use]
    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    /// Path of the content file for a validated name.
    fn content_path(&self, name: &str) -> PathBuf {
        segments(name).fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Create the missing parent directories of `path`.
    ///
    /// Returns the directories that did not exist before, outermost first.
    async fn prepare_parent(&self, path: &Path) -> StoreResult<Vec<PathBuf>> {
        let Some(parent) = path.parent() else {
            return Ok(Vec::new());
        };

        let mut created = Vec::new();
        for dir in parent.ancestors().take_while(|dir| *dir != self.root) {
            if fs::try_exists(dir).await? {
                break;
            }
            created.push(dir.to_path_buf());
        }
        created.reverse();

        fs::create_dir_all(parent).await?;
        Ok(created)
    }

    /// Remove directories created for a save that failed, innermost first.
    async fn discard_created(created: &[PathBuf]) {
        for dir in created.iter().rev() {
            // Fails harmlessly if a concurrent save already wrote into it.
            if fs::remove_dir(dir).await.is_err() {
                break;
            }
        }
    }

    async fn read_content_type(&self, path: &Path) -> StoreResult<String> {
        match fs::read_to_string(with_suffix(path, SIDECAR_SUFFIX)).await {
            Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => Ok(self.default_content_type.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Content type sidecar missing, using default");
                Ok(self.default_content_type.clone())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_content_type(&self, path: &Path, content_type: Option<&str>) -> StoreResult<()> {
        let content_type = effective_content_type(content_type, &self.default_content_type);
        replace_file(&with_suffix(path, SIDECAR_SUFFIX), content_type.as_bytes()).await
    }

    /// Remove the immediate parent directory if it is empty and not the root.
    async fn remove_empty_parent(&self, path: &Path) -> StoreResult<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent == self.root {
            return Ok(());
        }

        let mut entries = fs::read_dir(parent).await?;
        if entries.next_entry().await?.is_some() {
            return Ok(());
        }

        match fs::remove_dir(parent).await {
            Ok(()) => Ok(()),
            // Another caller wrote into or removed the folder meanwhile.
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stream `reader` into a fresh temporary file next to `path`, then
    /// move it over `path`. `buf[..filled]` holds data already read.
    async fn write_streamed<R>(
        path: &Path,
        reader: &mut R,
        buf: &mut [u8],
        mut filled: usize,
    ) -> StoreResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let (file, temp_path) = temp_sibling(path)?;
        let mut file = fs::File::from_std(file);
        while filled > 0 {
            file.write_all(&buf[..filled]).await?;
            filled = read_chunk(reader, buf).await?;
        }
        file.flush().await?;
        drop(file);

        temp_path.persist(path).map_err(|e| StoreError::Io(e.error))
    }
}

impl BlobStore for FileSystemStore {
    async fn exists(&self, name: &str) -> StoreResult<bool> {
        ensure_name(name)?;
        is_file(&self.content_path(name)).await
    }

    async fn delete(&self, name: &str) -> StoreResult<bool> {
        ensure_name(name)?;

        let path = self.content_path(name);
        if !is_file(&path).await? {
            debug!(name, "Delete skipped, object not found");
            return Ok(false);
        }

        fs::remove_file(&path).await?;

        match fs::remove_file(with_suffix(&path, SIDECAR_SUFFIX)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.remove_empty_parent(&path).await?;

        debug!(name, "Object deleted");
        Ok(true)
    }

    async fn load(&self, name: &str) -> StoreResult<Option<StoredObject>> {
        ensure_name(name)?;

        let path = self.content_path(name);
        if !is_file(&path).await? {
            return Ok(None);
        }

        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content_type = self.read_content_type(&path).await?;

        debug!(name, size = content.len(), %content_type, "Object loaded");
        Ok(Some(StoredObject {
            content: Bytes::from(content),
            content_type,
        }))
    }

    async fn save(&self, name: &str, content: Bytes, content_type: Option<&str>) -> StoreResult<()> {
        ensure_name(name)?;
        ensure_content_type(content_type)?;

        let path = self.content_path(name);
        self.prepare_parent(&path).await?;
        replace_file(&path, &content).await?;
        self.write_content_type(&path, content_type).await?;

        debug!(name, size = content.len(), "Object saved");
        Ok(())
    }

    async fn save_reader<R>(
        &self,
        name: &str,
        mut reader: R,
        content_type: Option<&str>,
    ) -> StoreResult<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        ensure_name(name)?;
        ensure_content_type(content_type)?;

        // An unreadable stream is reported before anything is created.
        let mut buf = vec![0_u8; self.buffer_size];
        let filled = read_chunk(&mut reader, &mut buf).await?;

        let path = self.content_path(name);
        let created = self.prepare_parent(&path).await?;

        if let Err(e) = Self::write_streamed(&path, &mut reader, &mut buf, filled).await {
            Self::discard_created(&created).await;
            return Err(e);
        }
        self.write_content_type(&path, content_type).await?;

        debug!(name, "Object saved from stream");
        Ok(())
    }

    async fn load_to_writer<W>(&self, name: &str, mut writer: W) -> StoreResult<Option<String>>
    where
        W: AsyncWrite + Unpin + Send,
    {
        ensure_name(name)?;

        let path = self.content_path(name);
        if !is_file(&path).await? {
            return Ok(None);
        }

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content_type = self.read_content_type(&path).await?;

        let mut reader = BufReader::with_capacity(self.buffer_size, file);
        tokio::io::copy_buf(&mut reader, &mut writer).await?;
        writer.flush().await?;

        Ok(Some(content_type))
    }
}

/// Create an anonymous temporary file in the directory of `path`.
///
/// Temporary names end in `$partial`, which no object name can contain.
fn temp_sibling(path: &Path) -> StoreResult<(std::fs::File, tempfile::TempPath)> {
    let parent = path.parent().unwrap_or(path);
    let temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(PARTIAL_SUFFIX)
        .tempfile_in(parent)?;
    Ok(temp.into_parts())
}

/// Replace the file at `path` with `content` in one rename.
///
/// Concurrent writers never interleave: each writes its own temporary file
/// and the last rename wins.
async fn replace_file(path: &Path, content: &[u8]) -> StoreResult<()> {
    let (file, temp_path) = temp_sibling(path)?;
    let mut file = fs::File::from_std(file);
    file.write_all(content).await?;
    file.flush().await?;
    drop(file);

    temp_path.persist(path).map_err(|e| StoreError::Io(e.error))
}

/// Read the next chunk of a caller supplied stream, 0 at end of stream.
async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> StoreResult<usize>
where
    R: AsyncRead + Unpin + Send,
{
    reader
        .read(buf)
        .await
        .map_err(|e| StoreError::argument(format!("the stream does not support reading: {e}")))
}

/// True iff `path` is a regular file. Missing paths are `false`, not errors.
async fn is_file(path: &Path) -> StoreResult<bool> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Append a suffix to the file name of `path`.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
