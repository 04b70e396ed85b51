//! Configuration management for the trade registry server.
//!
//! This module provides configuration loading from both base configuration file
//! and environment variables. Environment variables override the base configuration
//! and use the prefix `TRADEREGISTRY_`.

use core::time::Duration;

use config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Loads the application configuration from base config and environment variables.
///
/// Environment variables use double underscores `__` to denote nested keys.
/// For example, `TRADEREGISTRY_APP__LISTEN` corresponds to `app.listen`.
///
/// # Errors
///
/// If the configuration could not be loaded or parsed
pub fn get_configuration() -> Result<Config, ConfigError> {
    config::Config::builder()
        .add_source(File::from_str(include_str!("base_config.ron"), FileFormat::Ron))
        .add_source(
            Environment::with_prefix(Config::CONFIG_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

/// Root configuration structure containing all application settings.
#[derive(Deserialize)]
pub struct Config {
    /// Application-specific configuration
    pub app: AppConfig,

    /// Wallet authentication and session configuration
    pub auth: AuthConfig,

    /// Chain gateway configuration
    pub chain: ChainConfig,

    /// Uploaded-file custody configuration
    pub custody: CustodyConfig,
}

/// Application-specific configuration settings.
#[derive(Deserialize)]
pub struct AppConfig {
    /// The address to listen on (e.g., "0.0.0.0:8080")
    pub listen: String,

    /// CORS allowed origins (e.g., ["http://localhost:3000", "https://example.com"])
    /// Use ["*"] to allow all origins
    pub cors_allowed_origins: Vec<String>,

    /// Maximum accepted request body size in bytes; uploads above it are
    /// rejected with 413
    pub max_upload_bytes: usize,
}

/// Wallet authentication and session configuration settings.
#[derive(Deserialize)]
pub struct AuthConfig {
    /// Secret that signs session tokens; must be at least 32 bytes
    pub jwt_secret: String,

    /// Whether session cookies are marked `Secure` (HTTPS-only)
    pub secure_cookies: bool,

    /// Wallet addresses granted access to the admin endpoints
    pub admin_addresses: Vec<String>,
}

/// Chain gateway configuration settings.
#[derive(Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the Ethereum-compatible node
    pub rpc_url: String,

    /// Chain id applied to transaction signatures (e.g., 11155111 for Sepolia)
    pub chain_id: u64,

    /// Hex-encoded private key that signs every backend transaction
    pub signer_key: String,

    /// Deployed registry contract address
    pub registry_address: String,

    /// Deployed DAO contract address
    pub dao_address: String,

    /// Fixed gas price applied to every submission, in gwei
    pub gas_price_gwei: u64,

    /// How long DAO finalization waits for its transaction receipt
    #[serde(with = "humantime_serde")]
    pub receipt_timeout: Duration,
}

/// Uploaded-file custody configuration settings.
#[derive(Deserialize)]
pub struct CustodyConfig {
    /// Directory where fresh uploads are staged
    pub staging_dir: String,

    /// Directory finalized files are moved into
    pub private_dir: String,

    /// How often the retention sweep runs
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Config {
    const CONFIG_ENV_PREFIX: &str = "TRADEREGISTRY";
}
