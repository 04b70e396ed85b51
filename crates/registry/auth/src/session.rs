//! Session token issuance and validation.

use chrono::Utc;
use ethers::types::Address;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use trade_registry_utils::{checksum_hex, parse_wallet_address};
use uuid::Uuid;

use crate::error::{AuthError, Result};

/// Session lifetime in seconds. Fixed at thirty minutes from issuance.
pub const SESSION_TTL_SECS: u64 = 1800;

/// Minimum length accepted for the signing secret.
const MIN_SECRET_BYTES: usize = 32;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The authenticated wallet address, checksummed.
    pub sub: String,
    /// Absolute expiry as a unix timestamp.
    pub exp: u64,
    /// Unique token id.
    pub jti: String,
}

/// Signs and validates session tokens.
///
/// Tokens are HS512 JWTs and entirely stateless: there is no revocation list,
/// so a token stays cryptographically valid until its expiry even after the
/// client discards its cookie.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionIssuer {
    /// Creates an issuer over the given signing secret.
    ///
    /// # Errors
    ///
    /// [`AuthError::WeakSecret`] when the secret is shorter than 32 bytes.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::WeakSecret(MIN_SECRET_BYTES));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Issues a session token for the address.
    pub fn issue(&self, address: Address) -> Result<String> {
        let now = Utc::now().timestamp() as u64;

        let claims = SessionClaims {
            sub: checksum_hex(address),
            exp: now + SESSION_TTL_SECS,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|err| AuthError::other(err.to_string()))
    }

    /// Validates a token and returns the wallet address it binds.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenExpired`] past the expiry, [`AuthError::InvalidToken`]
    /// for anything else that fails to verify.
    pub fn validate(&self, token: &str) -> Result<Address> {
        let data = decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS512),
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        parse_wallet_address(&data.claims.sub).map_err(|_| AuthError::InvalidToken)
    }
}
