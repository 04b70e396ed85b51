//! Wallet-based authentication for the trade registry.
//!
//! Login is a two-step challenge. A wallet first requests a nonce for its
//! address, then signs `"Sign this message: <nonce>"` with its key. When the
//! recovered signer matches the requesting address, the nonce is consumed and
//! a short-lived HS512 session token is issued.
//!
//! # Main Components
//!
//! - [`WalletAuth`]: the facade the HTTP layer talks to.
//! - [`NonceStore`]: single-use login challenges keyed by wallet address.
//! - [`SessionIssuer`]: stateless JWT sessions with a 30 minute lifetime.
//!
//! # Usage
//!
//! ```no_run
//! # use trade_registry_auth::WalletAuth;
//! # fn demo() -> trade_registry_auth::Result<()> {
//! let auth = WalletAuth::new("an-at-least-32-byte-signing-secret!!")?;
//! let nonce = auth.request_nonce("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap());
//! # let _ = nonce;
//! # Ok(())
//! # }
//! ```

mod error;
mod nonce;
mod session;
mod signature;

use ethers::types::Address;
use trade_registry_store::{KeyedStore, MemoryStore};
use trade_registry_utils::lowercase_hex;

pub use self::{
    error::{AuthError, Result},
    nonce::NonceStore,
    session::{SESSION_TTL_SECS, SessionClaims, SessionIssuer},
    signature::{SIGN_MESSAGE_PREFIX, recover_signer},
};

// WALLET AUTH
// ================================================================================================

/// Challenge-response wallet authentication with JWT sessions.
///
/// Generic over the nonce store backend so tests can substitute their own;
/// production uses the in-memory [`MemoryStore`].
pub struct WalletAuth<S = MemoryStore<String>> {
    nonces: NonceStore<S>,
    sessions: SessionIssuer,
}

impl WalletAuth {
    /// Creates an authenticator over an in-memory nonce store.
    ///
    /// # Errors
    ///
    /// [`AuthError::WeakSecret`] when `jwt_secret` is shorter than 32 bytes.
    pub fn new(jwt_secret: &str) -> Result<Self> {
        Ok(Self { nonces: NonceStore::in_memory(), sessions: SessionIssuer::new(jwt_secret)? })
    }
}

impl<S> WalletAuth<S>
where
    S: KeyedStore<String>,
{
    /// Creates an authenticator over the provided nonce store backend.
    ///
    /// # Errors
    ///
    /// [`AuthError::WeakSecret`] when `jwt_secret` is shorter than 32 bytes.
    pub fn with_store(jwt_secret: &str, store: S) -> Result<Self> {
        Ok(Self { nonces: NonceStore::with_store(store), sessions: SessionIssuer::new(jwt_secret)? })
    }

    /// Issues a fresh login nonce for `address`, replacing any outstanding one.
    #[tracing::instrument(skip_all, fields(address = %address))]
    pub fn request_nonce(&self, address: Address) -> String {
        self.nonces.issue(address)
    }

    /// Verifies a signed login challenge and issues a session token.
    ///
    /// The outstanding nonce for `address` is consumed only when verification
    /// succeeds, so a failed attempt can be retried with the same challenge.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NonceNotFound`] when no challenge is outstanding for
    ///   `address`.
    /// - [`AuthError::MalformedSignature`] when the signature does not decode.
    /// - [`AuthError::SignatureMismatch`] when the recovered signer is not
    ///   `address`.
    #[tracing::instrument(skip_all, fields(address = %address))]
    pub fn verify_signature(&self, address: Address, signature: &str) -> Result<String> {
        let nonce = self
            .nonces
            .peek(address)
            .ok_or_else(|| AuthError::NonceNotFound(lowercase_hex(address)))?;

        let recovered = recover_signer(&nonce, signature)?;
        if recovered != address {
            return Err(AuthError::SignatureMismatch);
        }

        self.nonces.consume(address);
        self.sessions.issue(address)
    }

    /// Validates a session token and returns the wallet address it grants.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenExpired`] for stale tokens, [`AuthError::InvalidToken`]
    /// for everything else that fails validation.
    pub fn validate_session(&self, token: &str) -> Result<Address> {
        self.sessions.validate(token)
    }
}
