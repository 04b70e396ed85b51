//! utils crate for the trade registry system.

mod address;

pub use self::address::{WalletAddressError, checksum_hex, lowercase_hex, parse_wallet_address};
