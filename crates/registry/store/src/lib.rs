//! Backend-local storage for the trade registry.
//!
//! This crate provides the process-local state the backend keeps next to the
//! chain: uploaded contract PDFs and their lifecycle records. Nothing here is
//! durable; a restart drops all records, which is the documented operating
//! model for pending uploads.
//!
//! # Main Components
//!
//! - [`KeyedStore`] - The injected store interface (get / put / delete / sweep)
//! - [`MemoryStore`] - The in-memory implementation over a sharded map
//! - [`FileCustody`] - Upload validation, staging, relocation, and expiry
//! - [`CustodyError`] - Error types for custody operations
//!
//! # Usage
//!
//! ```ignore
//! let custody = FileCustody::open("./uploads", "./private").await?;
//!
//! let record = custody.store(&trade_id, &tx_hash, "application/pdf", &bytes).await?;
//! let bytes = custody.reveal(&trade_id).await?;
//! custody.finalize(&trade_id).await?;
//! let purged = custody.sweep_expired(Utc::now()).await;
//! ```

mod error;
mod keyed;

pub use self::{
    error::{CustodyError, Result},
    keyed::{KeyedStore, MemoryStore},
};

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tokio::fs;
use trade_registry_domain::{FileRecord, TradeId};

/// How long a stored file lives, in seconds, counted from `created_at`.
///
/// The window is fixed: expiry never looks at the `moved` flag, so a
/// finalized file is purged on the same clock as an abandoned one.
pub const RETENTION_SECS: i64 = 86_400;

const PDF_MAGIC: &[u8] = b"%PDF";
const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Checks that an upload both claims and carries PDF content.
///
/// Callers can run this before anything is submitted on chain;
/// [`FileCustody::store`] applies the same checks again when the file lands.
///
/// # Errors
///
/// [`CustodyError::NotPdf`] when the content lacks the PDF magic marker,
/// [`CustodyError::WrongMediaType`] when it was declared as anything other
/// than `application/pdf`.
pub fn validate_upload(media_type: &str, content: &[u8]) -> Result<()> {
    if !content.starts_with(PDF_MAGIC) {
        return Err(CustodyError::NotPdf);
    }

    if media_type != PDF_MEDIA_TYPE {
        return Err(CustodyError::WrongMediaType(media_type.into()));
    }

    Ok(())
}

/// Custody of uploaded contract PDFs.
///
/// Files start in a public-readable staging directory, move to a private
/// directory when their trade is finalized, and are purged once older than
/// [`RETENTION_SECS`]. Records live in an injected [`KeyedStore`] keyed by
/// trade id.
pub struct FileCustody<S = MemoryStore<FileRecord>> {
    records: S,
    staging_dir: PathBuf,
    private_dir: PathBuf,
}

impl FileCustody<MemoryStore<FileRecord>> {
    /// Opens custody over the default in-memory record store, creating both
    /// directories if needed.
    pub async fn open(
        staging_dir: impl Into<PathBuf>,
        private_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        Self::open_with(MemoryStore::new(), staging_dir, private_dir).await
    }
}

impl<S> FileCustody<S>
where
    S: KeyedStore<FileRecord>,
{
    /// Opens custody over an injected record store, creating both directories
    /// if needed.
    pub async fn open_with(
        records: S,
        staging_dir: impl Into<PathBuf>,
        private_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let staging_dir = staging_dir.into();
        let private_dir = private_dir.into();

        fs::create_dir_all(&staging_dir).await?;
        fs::create_dir_all(&private_dir).await?;

        Ok(Self { records, staging_dir, private_dir })
    }

    /// Validates and stores an uploaded PDF for the given trade.
    ///
    /// Content must start with the PDF magic marker and must have been
    /// declared as `application/pdf`. The file name is the registering
    /// transaction hash without its `0x` prefix, so re-storing the same
    /// transaction overwrites rather than duplicates.
    ///
    /// # Errors
    ///
    /// [`CustodyError::NotPdf`] or [`CustodyError::WrongMediaType`] when
    /// validation fails, [`CustodyError::Io`] when the write fails.
    #[tracing::instrument(skip_all, fields(trade_id = %trade_id, size = content.len()))]
    pub async fn store(
        &self,
        trade_id: &TradeId,
        tx_hash: &str,
        media_type: &str,
        content: &[u8],
    ) -> Result<FileRecord> {
        validate_upload(media_type, content)?;

        let filename = format!("{}.pdf", tx_hash.trim_start_matches("0x"));
        fs::write(self.staging_dir.join(&filename), content).await?;

        let record = FileRecord::builder()
            .filename(filename)
            .created_at(Utc::now())
            .build();
        self.records.put(trade_id.to_string(), record.clone());

        Ok(record)
    }

    /// Returns the staged file content for a trade.
    ///
    /// # Errors
    ///
    /// [`CustodyError::NotFound`] when no record exists, the record is marked
    /// moved, or the staged file is gone.
    #[tracing::instrument(skip_all, fields(trade_id = %trade_id))]
    pub async fn reveal(&self, trade_id: &TradeId) -> Result<Vec<u8>> {
        let not_found = || CustodyError::NotFound(trade_id.to_string());

        let record = self.records.get(trade_id.as_str()).ok_or_else(not_found)?;
        if record.moved() {
            return Err(not_found());
        }

        match fs::read(self.staging_dir.join(record.filename())).await {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(error) => Err(error.into()),
        }
    }

    /// Relocates a trade's file from staging to the private area and marks
    /// the record moved.
    ///
    /// Idempotent: a missing record or an already-moved file is a no-op.
    #[tracing::instrument(skip_all, fields(trade_id = %trade_id))]
    pub async fn finalize(&self, trade_id: &TradeId) -> Result<()> {
        let Some(record) = self.records.get(trade_id.as_str()) else {
            return Ok(());
        };
        if record.moved() {
            return Ok(());
        }

        let from = self.staging_dir.join(record.filename());
        let to = self.private_dir.join(record.filename());

        match fs::rename(&from, &to).await {
            Ok(()) => {}
            // A staged file that vanished still flips the record, keeping
            // reveal closed for this trade.
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }

        self.records.put(trade_id.to_string(), record.mark_moved());

        Ok(())
    }

    /// Removes every record older than the retention window, along with its
    /// file, and returns how many were purged.
    ///
    /// Expiry is judged on age alone; `moved` records and staged records go
    /// through the same window.
    #[tracing::instrument(skip_all, fields(%now))]
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let retention = chrono::Duration::seconds(RETENTION_SECS);
        let removed = self
            .records
            .sweep(&|_, record: &FileRecord| record.expired(now, retention));

        for (trade_id, record) in &removed {
            let dir = if record.moved() { &self.private_dir } else { &self.staging_dir };
            remove_quietly(trade_id, &dir.join(record.filename())).await;
        }

        if !removed.is_empty() {
            tracing::info!(purged = removed.len(), "swept expired custody files");
        }

        removed.len()
    }

    /// Whether the trade's file has left the staging area.
    ///
    /// An absent record reports `true`: a purged or never-stored file is as
    /// unavailable as a moved one.
    pub fn is_moved(&self, trade_id: &TradeId) -> bool {
        self.records
            .get(trade_id.as_str())
            .map(|record| record.moved())
            .unwrap_or(true)
    }
}

async fn remove_quietly(trade_id: &str, path: &Path) {
    if let Err(error) = fs::remove_file(path).await {
        if error.kind() != ErrorKind::NotFound {
            tracing::warn!(%trade_id, path = %path.display(), %error, "failed to remove expired file");
        }
    }
}
