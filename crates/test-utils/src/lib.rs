//! Test utilities for trade registry components.
//!
//! This crate provides helpers for exercising the wallet-signature flows and
//! the upload pipeline: throwaway signing wallets, browser-style personal
//! signing, and well-formed sample PDFs.
//!
//! The APIs are thin wrappers around `ethers` signing facilities while
//! exposing a stable interface for this repository's tests.

use ethers::{
    core::rand,
    signers::{LocalWallet, Signer},
    types::Address,
};

// HELPERS
// ================================================================================================

/// Creates a fresh throwaway wallet for signing test messages.
///
/// Each call returns a distinct random key; use [`wallet_address`] to get the
/// matching claimed address.
pub fn throwaway_wallet() -> LocalWallet {
    LocalWallet::new(&mut rand::thread_rng())
}

/// Returns the wallet's address.
pub fn wallet_address(wallet: &LocalWallet) -> Address {
    wallet.address()
}

/// Signs `message` the way browser wallets do (EIP-191 personal sign) and
/// returns the `0x`-prefixed signature hex.
pub async fn personal_sign(wallet: &LocalWallet, message: &str) -> String {
    let signature = wallet
        .sign_message(message)
        .await
        .expect("local wallet signing cannot fail");

    format!("0x{signature}")
}

/// A minimal but well-formed PDF body.
///
/// Starts with the `%PDF` magic marker so it passes upload validation; the
/// trailing bytes make each document's hash depend on `seed`.
pub fn sample_pdf(seed: &str) -> Vec<u8> {
    let mut body = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n".to_vec();
    body.extend_from_slice(seed.as_bytes());
    body.extend_from_slice(b"\n%%EOF\n");
    body
}

/// A well-formed 32-byte transaction hash string with `0x` prefix.
pub fn sample_tx_hash(fill: u8) -> String {
    format!("0x{}", hex::encode([fill; 32]))
}
