use ethers::{types::Address, utils::to_checksum};

/// Parses a wallet address, requiring the `0x` prefix and exactly 40 hex
/// digits.
///
/// # Errors
///
/// When the string is not a `0x`-prefixed 40-digit hex address.
pub fn parse_wallet_address(input: &str) -> Result<Address, WalletAddressError> {
    let malformed = || WalletAddressError::Malformed(input.into());

    let hex_part = input.strip_prefix("0x").ok_or_else(malformed)?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    input.parse().map_err(|_| malformed())
}

/// Formats an address as `0x` plus 40 lowercase hex digits.
///
/// This is the canonical form for map keys and case-insensitive comparison.
pub fn lowercase_hex(address: Address) -> String {
    format!("{address:#x}")
}

/// Formats an address in EIP-55 checksum form for display.
pub fn checksum_hex(address: Address) -> String {
    to_checksum(&address, None)
}

/// Error that occurs while invoking [`parse_wallet_address`].
#[derive(Debug, thiserror::Error)]
pub enum WalletAddressError {
    /// The input was not a `0x`-prefixed 40-digit hex address.
    #[error("wallet address must be 0x followed by 40 hex digits, got {0:?}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn parse_accepts_any_casing() {
        let lower = parse_wallet_address(&CHECKSUMMED.to_lowercase()).expect("lowercase parses");
        let mixed = parse_wallet_address(CHECKSUMMED).expect("checksummed parses");

        assert_eq!(lower, mixed);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in [
            "",
            "5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAe",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed0",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAzz",
        ] {
            assert!(parse_wallet_address(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn lowercase_and_checksum_round_out_the_same_address() {
        let address = parse_wallet_address(CHECKSUMMED).expect("valid address");

        assert_eq!(lowercase_hex(address), CHECKSUMMED.to_lowercase());
        assert_eq!(checksum_hex(address), CHECKSUMMED);
    }
}
