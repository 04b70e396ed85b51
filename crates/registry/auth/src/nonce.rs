//! Per-address login nonces.

use ethers::types::Address;
use rand::RngCore;
use trade_registry_store::{KeyedStore, MemoryStore};
use trade_registry_utils::lowercase_hex;

/// Number of random bytes behind each nonce.
const NONCE_BYTES: usize = 32;

/// Issues and tracks the random nonce each wallet must sign to log in.
///
/// Nonces are keyed by the lowercased address and overwritten on every
/// issuance, so only the most recently requested nonce verifies. There is no
/// expiry; a nonce lives until it is consumed, displaced, or the process
/// restarts.
pub struct NonceStore<S = MemoryStore<String>> {
    nonces: S,
}

impl NonceStore<MemoryStore<String>> {
    /// Creates a nonce store over the default in-memory map.
    pub fn in_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl<S> NonceStore<S>
where
    S: KeyedStore<String>,
{
    /// Creates a nonce store over an injected keyed store.
    pub fn with_store(nonces: S) -> Self {
        Self { nonces }
    }

    /// Issues a fresh nonce for the address, displacing any prior one.
    pub fn issue(&self, address: Address) -> String {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let nonce = hex::encode(bytes);

        self.nonces.put(lowercase_hex(address), nonce.clone());

        nonce
    }

    /// Returns the current nonce for the address without consuming it.
    pub fn peek(&self, address: Address) -> Option<String> {
        self.nonces.get(&lowercase_hex(address))
    }

    /// Removes and returns the current nonce for the address.
    pub fn consume(&self, address: Address) -> Option<String> {
        self.nonces.delete(&lowercase_hex(address))
    }
}
