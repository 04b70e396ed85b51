use std::borrow::Cow;

pub type Result<T, E = CustodyError> = core::result::Result<T, E>;

/// Errors that can occur in the file custody layer.
#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    /// The uploaded content does not begin with the PDF magic marker.
    ///
    /// Checked against the raw bytes, so a misnamed or mislabeled upload is
    /// caught regardless of its extension or declared media type.
    #[error("file content is not a PDF")]
    NotPdf,

    /// The upload declared a media type other than `application/pdf`.
    #[error("unsupported media type: {0}")]
    WrongMediaType(String),

    /// No revealable file exists for the trade.
    ///
    /// Raised when the record is absent, the file has been moved to the
    /// private area, or the underlying file is gone.
    #[error("no stored file for trade {0}")]
    NotFound(String),

    /// A filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An unclassified error occurred.
    #[error("other error: {0}")]
    Other(Cow<'static, str>),
}

impl CustodyError {
    /// Creates an unclassified error from any printable reason.
    pub fn other(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Other(reason.into())
    }
}
