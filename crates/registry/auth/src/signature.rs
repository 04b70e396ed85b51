//! Wallet signature recovery.

use ethers::types::{Address, Signature};

use crate::error::{AuthError, Result};

/// The fixed prefix every login message starts with; the nonce follows it.
pub const SIGN_MESSAGE_PREFIX: &str = "Sign this message: ";

/// Recovers the signer address from a personal-sign signature over the login
/// message for `nonce`.
///
/// Recovery applies the EIP-191 personal-message envelope, matching what
/// browser wallets sign.
///
/// # Errors
///
/// [`AuthError::MalformedSignature`] when the signature hex cannot be
/// decoded, [`AuthError::SignatureMismatch`] when recovery itself fails.
pub fn recover_signer(nonce: &str, signature: &str) -> Result<Address> {
    let signature: Signature = signature
        .parse()
        .map_err(|_| AuthError::MalformedSignature(signature.into()))?;

    let message = format!("{SIGN_MESSAGE_PREFIX}{nonce}");

    signature.recover(message).map_err(|_| AuthError::SignatureMismatch)
}
