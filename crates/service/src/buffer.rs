//! Upload buffering between multipart intake and the store call.
//!
//! Memory mode accumulates chunks in a `BytesMut`. Disk mode streams them
//! into a uniquely named file under the temp dir; the file is owned by a
//! [`TempFile`] guard and is removed when the guard is consumed or dropped.

use std::io;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use configs::BufferMode;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use crate::errors::UploadError;

/// Temp file removed on [`TempFile::remove`] or, failing that, on drop.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    removed: bool,
}

impl TempFile {
    pub async fn create(dir: &Path) -> io::Result<(Self, tokio::fs::File)> {
        let path = dir.join(format!("{}.upload", Uuid::new_v4()));
        let file = tokio::fs::File::create(&path).await?;
        Ok((Self { path, removed: false }, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> io::Result<Bytes> {
        tokio::fs::read(&self.path).await.map(Bytes::from)
    }

    pub async fn remove(mut self) -> io::Result<()> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.removed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "failed to remove temp upload");
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum FileBody {
    Memory(Bytes),
    Disk(TempFile),
}

/// A fully received upload, ready for the store step.
#[derive(Debug)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub body: FileBody,
}

enum Sink {
    Memory(BytesMut),
    Disk { temp: TempFile, file: tokio::fs::File },
}

/// Incremental writer used while the multipart field streams in.
pub struct UploadBuffer {
    sink: Sink,
    size: u64,
    limit: Option<u64>,
}

impl UploadBuffer {
    pub async fn new(mode: BufferMode, temp_dir: &Path, limit: Option<u64>) -> Result<Self, UploadError> {
        let sink = match mode {
            BufferMode::Memory => Sink::Memory(BytesMut::new()),
            BufferMode::Disk => {
                let (temp, file) = TempFile::create(temp_dir)
                    .await
                    .map_err(|e| UploadError::Unexpected(format!("creating temp file: {e}")))?;
                Sink::Disk { temp, file }
            }
        };
        Ok(Self { sink, size: 0, limit })
    }

    /// Append a chunk, failing fast once the size limit is exceeded.
    pub async fn push(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.size += chunk.len() as u64;
        if let Some(limit) = self.limit {
            if self.size > limit {
                return Err(UploadError::TooLarge { limit });
            }
        }
        match &mut self.sink {
            Sink::Memory(buf) => buf.extend_from_slice(chunk),
            Sink::Disk { file, .. } => file
                .write_all(chunk)
                .await
                .map_err(|e| UploadError::Unexpected(format!("writing temp file: {e}")))?,
        }
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn finish(self) -> Result<(FileBody, u64), UploadError> {
        let body = match self.sink {
            Sink::Memory(buf) => FileBody::Memory(buf.freeze()),
            Sink::Disk { temp, mut file } => {
                file.flush()
                    .await
                    .map_err(|e| UploadError::Unexpected(format!("flushing temp file: {e}")))?;
                drop(file);
                FileBody::Disk(temp)
            }
        };
        Ok((body, self.size))
    }
}
