use std::borrow::Cow;

pub type Result<T, E = AuthError> = core::result::Result<T, E>;

/// Errors that can occur during wallet authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session token accompanied the request.
    #[error("missing session token")]
    MissingToken,

    /// The session token's expiry has passed.
    #[error("session token expired")]
    TokenExpired,

    /// The session token failed signature or structure checks.
    #[error("invalid session token")]
    InvalidToken,

    /// No nonce is on file for the claimed address.
    ///
    /// Either none was ever requested, it was consumed by a prior successful
    /// verification, or the process restarted since issuance.
    #[error("no nonce on file for {0}")]
    NonceNotFound(String),

    /// The recovered signer differs from the claimed address.
    #[error("signature does not match the claimed address")]
    SignatureMismatch,

    /// The signature string could not be decoded at all.
    ///
    /// Distinct from [`AuthError::SignatureMismatch`]: this is malformed
    /// input, not a failed proof, and maps to a validation failure upstream.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The configured JWT secret is too short to sign sessions with.
    #[error("jwt secret must be at least {0} bytes")]
    WeakSecret(usize),

    /// An unclassified error occurred.
    #[error("other error: {0}")]
    Other(Cow<'static, str>),
}

impl AuthError {
    /// Creates an unclassified error from any printable reason.
    pub fn other(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Other(reason.into())
    }
}
