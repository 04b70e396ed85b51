//! The backend-local record of an uploaded contract document.

use bon::Builder;
use chrono::{DateTime, Utc};
use dissolve_derive::Dissolve;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metadata for one stored PDF, keyed by trade id in the custody store.
///
/// The record is ephemeral: it lives only as long as the retention window and
/// is lost on restart. `moved` marks relocation into the private area after
/// finalization; expiry is judged on `created_at` alone, never on `moved`.
#[derive(Debug, Clone, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileRecord {
    /// File name inside the staging or private directory.
    filename: String,

    /// When the upload was stored.
    created_at: DateTime<Utc>,

    /// Whether the file has been relocated to the private area.
    #[builder(default)]
    moved: bool,
}

impl FileRecord {
    /// Returns the stored file name.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the storage timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the file has been moved to the private area.
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Returns the record with `moved` set.
    pub fn mark_moved(mut self) -> Self {
        self.moved = true;
        self
    }

    /// Whether the record's age exceeds the given retention window.
    pub fn expired(&self, now: DateTime<Utc>, retention: chrono::Duration) -> bool {
        now.signed_duration_since(self.created_at) > retention
    }
}
