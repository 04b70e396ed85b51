//! # Configuration
//!
//! The server is configured through:
//! - Base configuration file (`base_config.ron`)
//! - Environment variables prefixed with `TRADEREGISTRY_` (override base config)
//!
//! ## Base Configuration
//!
//! The default configuration is loaded from `base_config.ron`:
//!
//! ```ron
//! Config(
//!     app: AppConfig(
//!         listen: "localhost:8080",
//!         cors_allowed_origins: ["*"],
//!         max_upload_bytes: 10485760,
//!     ),
//!     auth: AuthConfig(
//!         jwt_secret: "dev-only-jwt-secret-change-before-deploy",
//!         secure_cookies: false,
//!         admin_addresses: ["0x7315C7AD21E501faBFc86f3D546a8898be6D39b6"],
//!     ),
//!     chain: ChainConfig(
//!         rpc_url: "https://rpc.sepolia.org",
//!         chain_id: 11155111,
//!         signer_key: "...",
//!         registry_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3",
//!         dao_address: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512",
//!         gas_price_gwei: 30,
//!         receipt_timeout: "120s",
//!     ),
//!     custody: CustodyConfig(
//!         staging_dir: "./uploads",
//!         private_dir: "./private",
//!         sweep_interval: "1h",
//!     ),
//! )
//! ```
//!
//! ## Environment Variable Overrides
//!
//! Use double underscores (`__`) to override nested configuration fields:
//!
//! ```bash
//! # Override app config
//! export TRADEREGISTRY_APP__LISTEN="0.0.0.0:8080"
//! export TRADEREGISTRY_APP__MAX_UPLOAD_BYTES="10485760"
//!
//! # Configure CORS allowed origins
//! # For specific origins (recommended)
//! export TRADEREGISTRY_APP__CORS_ALLOWED_ORIGINS='["http://localhost:3000"]'
//!
//! # Override auth config
//! export TRADEREGISTRY_AUTH__JWT_SECRET="<at least 32 bytes of secret>"
//! export TRADEREGISTRY_AUTH__SECURE_COOKIES="true"
//!
//! # Override chain config
//! export TRADEREGISTRY_CHAIN__RPC_URL="https://sepolia.infura.io/v3/<key>"
//! export TRADEREGISTRY_CHAIN__SIGNER_KEY="<backend signer private key>"
//! export TRADEREGISTRY_CHAIN__REGISTRY_ADDRESS="0x..."
//! export TRADEREGISTRY_CHAIN__DAO_ADDRESS="0x..."
//!
//! # Override custody config
//! export TRADEREGISTRY_CUSTODY__STAGING_DIR="/var/lib/registry/uploads"
//! export TRADEREGISTRY_CUSTODY__SWEEP_INTERVAL="30m"
//!
//! # Run the server
//! cargo run --bin trade-registry-server
//! ```
//!
//! ## CORS Configuration
//!
//! The `cors_allowed_origins` field controls cross-origin resource sharing:
//! - **Empty array `[]`**: CORS is disabled
//! - **Specific origins**: Only listed origins are allowed (recommended for production)
//! - **Wildcard `["*"]`**: All origins are allowed (permissive mode, default for development)
//!
//! By default, the base configuration uses `["*"]` to allow all CORS requests for local
//! development convenience. For production deployments, it's recommended to override this with
//! specific allowed origins; session cookies only flow cross-origin when specific origins are
//! configured, since credentials cannot be combined with a wildcard.
//!
//! When specific origins are configured, the server allows:
//! - Methods: GET, POST, PUT, DELETE, OPTIONS
//! - Headers: Content-Type, Authorization
//! - Credentials: Enabled
//!
//! # Logging
//!
//! Logging is controlled via the `RUST_LOG` environment variable. Defaults to `info` level.
//!
//! The server logs:
//! - **HTTP requests**: Method, path, status code, and duration for all incoming requests
//! - **Client errors (4xx)**: Logged at `WARN` level with error details
//! - **Server errors (5xx)**: Logged at `ERROR` level with error details
//! - **Not found (404)**: Logged at `INFO` level
//!
//! Example log output:
//! ```text
//! INFO server listening at localhost:8080
//! INFO request{method=POST path=/api/register}
//! INFO request{method=POST path=/api/register}: close time.busy=312ms time.idle=9.1µs
//! WARN client error: invalid wallet address: ...
//! ERROR server error: chain error: ...
//! ```

use core::str::FromStr;
use std::{collections::HashSet, sync::Arc};

use axum::http::{HeaderValue, Method, header};
use chrono::Utc;
use tokio::{net::TcpListener, task, time};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Subscriber, subscriber};
use tracing_subscriber::{EnvFilter, Registry, fmt::format::FmtSpan, layer::SubscriberExt};
use trade_registry_auth::WalletAuth;
use trade_registry_engine::{ChainGateway, ChainGatewayConfig};
use trade_registry_server::{App, config};
use trade_registry_store::FileCustody;
use trade_registry_utils::parse_wallet_address;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = task::spawn_blocking(config::get_configuration).await??;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    subscriber::set_global_default(make_tracing_subscriber(env_filter))?;

    let custody = Arc::new(
        FileCustody::open(config.custody.staging_dir, config.custody.private_dir).await?,
    );

    let app = {
        let gateway_config = ChainGatewayConfig::builder()
            .rpc_url(config.chain.rpc_url.parse()?)
            .signer_key(config.chain.signer_key)
            .chain_id(config.chain.chain_id)
            .registry_address(parse_wallet_address(&config.chain.registry_address)?)
            .dao_address(parse_wallet_address(&config.chain.dao_address)?)
            .gas_price_gwei(config.chain.gas_price_gwei)
            .receipt_timeout(config.chain.receipt_timeout)
            .build();

        let admins: HashSet<_> = config
            .auth
            .admin_addresses
            .iter()
            .map(|address| parse_wallet_address(address))
            .collect::<Result<_, _>>()?;

        App::builder()
            .gateway(ChainGateway::connect(gateway_config)?.into())
            .auth(WalletAuth::new(&config.auth.jwt_secret)?.into())
            .custody(Arc::clone(&custody))
            .admins(admins.into())
            .secure_cookies(config.auth.secure_cookies)
            .upload_limit(config.app.max_upload_bytes)
            .build()
    };

    // The custody service only exposes the sweep operation; its cadence is
    // this binary's call.
    tokio::spawn({
        let sweep_interval = config.custody.sweep_interval;
        async move {
            let mut ticker = time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                custody.sweep_expired(Utc::now()).await;
            }
        }
    });

    let axum_handle = {
        let router = trade_registry_server::create_router(app);
        let cors = create_cors_layer(&config.app.cors_allowed_origins)?;
        let router = router.layer(TraceLayer::new_for_http()).layer(cors);

        let listener = TcpListener::bind(&config.app.listen)
            .await
            .inspect(|_| tracing::info!("server listening at {}", config.app.listen))?;

        tokio::spawn(async { axum::serve(listener, router).await })
    };

    axum_handle.await??;

    Ok(())
}

fn create_cors_layer<S>(allowed_origins: &[S]) -> anyhow::Result<CorsLayer>
where
    S: AsRef<str>,
{
    if allowed_origins.iter().map(AsRef::as_ref).any(|s| s == "*") {
        return Ok(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .map(AsRef::as_ref)
        .map(FromStr::from_str)
        .collect::<Result<_, _>>()?;

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Ok(cors)
}

fn make_tracing_subscriber(env_filter: EnvFilter) -> impl Subscriber {
    Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_line_number(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE),
        )
        .with(env_filter)
}
