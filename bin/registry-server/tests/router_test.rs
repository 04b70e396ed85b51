//! End-to-end router tests over an in-process app.
//!
//! The gateway points at an unreachable RPC endpoint, so these tests only
//! exercise paths that fail before any chain call: authentication, admin
//! gating, upload validation, and custody lookups.

use core::time::Duration;
use std::{collections::HashSet, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use ethers::{signers::LocalWallet, types::Address};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use trade_registry_auth::{SIGN_MESSAGE_PREFIX, WalletAuth};
use trade_registry_engine::{ChainGateway, ChainGatewayConfig};
use trade_registry_server::{App, create_router};
use trade_registry_store::FileCustody;
use trade_registry_test_utils::{personal_sign, sample_pdf, throwaway_wallet, wallet_address};
use trade_registry_utils::checksum_hex;

const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;
const BOUNDARY: &str = "test-boundary-7f9a2c";

#[tokio::test]
async fn health_answers_ok() {
    let server = test_server(&[], UPLOAD_LIMIT).await;

    let response = server.router.clone().oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_flow_issues_a_working_session() {
    let server = test_server(&[], UPLOAD_LIMIT).await;
    let wallet = throwaway_wallet();
    let address = checksum_hex(wallet_address(&wallet));

    let response = server
        .router
        .clone()
        .oneshot(json_request("POST", "/auth/nonce", json!({ "address": address })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let nonce = json_body(response).await["nonce"].as_str().expect("nonce field").to_owned();

    let signature = personal_sign(&wallet, &format!("{SIGN_MESSAGE_PREFIX}{nonce}")).await;
    let response = server
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            json!({ "address": address, "signature": signature }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("cookie text")
        .to_owned();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let cookie = set_cookie.split(';').next().expect("cookie pair").to_owned();
    let response =
        server.router.clone().oneshot(get_request("/auth/me", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["address"], json!(address));
}

#[tokio::test]
async fn me_without_session_is_unauthorized() {
    let server = test_server(&[], UPLOAD_LIMIT).await;

    let response = server.router.clone().oneshot(get_request("/auth/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .router
        .clone()
        .oneshot(get_request("/auth/me", Some("access_token=not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_without_an_outstanding_nonce_is_unauthorized() {
    let server = test_server(&[], UPLOAD_LIMIT).await;
    let wallet = throwaway_wallet();
    let address = checksum_hex(wallet_address(&wallet));
    let signature = personal_sign(&wallet, "Sign this message: stale").await;

    let response = server
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            json!({ "address": address, "signature": signature }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn nonce_rejects_malformed_addresses() {
    let server = test_server(&[], UPLOAD_LIMIT).await;

    let response = server
        .router
        .clone()
        .oneshot(json_request("POST", "/auth/nonce", json!({ "address": "not-an-address" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let detail = json_body(response).await["detail"].as_str().expect("detail field").to_owned();
    assert!(detail.contains("invalid wallet address"));
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let server = test_server(&[], UPLOAD_LIMIT).await;

    let response = server
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie =
        response.headers().get(header::SET_COOKIE).expect("set-cookie header").to_str().unwrap();
    assert_eq!(set_cookie, "access_token=; Max-Age=0; Path=/");
}

#[tokio::test]
async fn register_requires_a_session() {
    let server = test_server(&[], UPLOAD_LIMIT).await;

    let request =
        multipart_request(None, "contract.pdf", "application/pdf", &sample_pdf("no-session"));
    let response = server.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_rejects_non_pdf_content() {
    let server = test_server(&[], UPLOAD_LIMIT).await;
    let cookie = login(&server.router, &throwaway_wallet()).await;

    let request = multipart_request(
        Some(&cookie),
        "contract.pdf",
        "application/pdf",
        b"GIF89a definitely not a pdf",
    );
    let response = server.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let detail = json_body(response).await["detail"].as_str().expect("detail field").to_owned();
    assert!(detail.contains("not a PDF"));
}

#[tokio::test]
async fn register_rejects_wrong_extensions() {
    let server = test_server(&[], UPLOAD_LIMIT).await;
    let cookie = login(&server.router, &throwaway_wallet()).await;

    let request = multipart_request(
        Some(&cookie),
        "contract.txt",
        "application/pdf",
        &sample_pdf("wrong-extension"),
    );
    let response = server.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_mislabeled_media_types() {
    let server = test_server(&[], UPLOAD_LIMIT).await;
    let cookie = login(&server.router, &throwaway_wallet()).await;

    let request = multipart_request(
        Some(&cookie),
        "contract.pdf",
        "text/plain",
        &sample_pdf("mislabeled"),
    );
    let response = server.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_uploads_are_rejected() {
    let server = test_server(&[], 1024).await;
    let cookie = login(&server.router, &throwaway_wallet()).await;

    let mut content = sample_pdf("oversized");
    content.resize(4096, b'0');
    let request = multipart_request(Some(&cookie), "contract.pdf", "application/pdf", &content);
    let response = server.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn admin_routes_refuse_outsiders() {
    let server = test_server(&[], UPLOAD_LIMIT).await;

    let response = server
        .router
        .clone()
        .oneshot(get_request("/api/admin/check-admin", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&server.router, &throwaway_wallet()).await;
    let response = server
        .router
        .clone()
        .oneshot(get_request("/api/admin/check-admin", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn check_admin_accepts_allow_listed_wallets() {
    let wallet = throwaway_wallet();
    let server = test_server(&[wallet_address(&wallet)], UPLOAD_LIMIT).await;
    let cookie = login(&server.router, &wallet).await;

    let response = server
        .router
        .clone()
        .oneshot(get_request("/api/admin/check-admin", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "is_admin": true }));
}

#[tokio::test]
async fn viewing_unknown_trades_is_not_found() {
    let server = test_server(&[], UPLOAD_LIMIT).await;
    let cookie = login(&server.router, &throwaway_wallet()).await;

    let response = server
        .router
        .clone()
        .oneshot(get_request("/api/contract/view?trade_id=TRD-20250101120000-0011aabb", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_trade_ids_are_rejected() {
    let server = test_server(&[], UPLOAD_LIMIT).await;
    let cookie = login(&server.router, &throwaway_wallet()).await;

    let response = server
        .router
        .clone()
        .oneshot(get_request("/api/contract/view?trade_id=nope", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contract_info_serves_the_embedded_abis() {
    let server = test_server(&[], UPLOAD_LIMIT).await;

    for uri in ["/api/contract-info", "/api/dao/contract-info"] {
        let response = server.router.clone().oneshot(get_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let address = body["contract_address"].as_str().expect("contract_address field");
        assert!(address.starts_with("0x"));
        assert!(!body["abi"].as_array().expect("abi array").is_empty());
    }
}

// HELPERS
// ================================================================================================

struct TestServer {
    router: Router,
    _staging: TempDir,
    _private: TempDir,
}

async fn test_server(admins: &[Address], upload_limit: usize) -> TestServer {
    let staging = TempDir::new().expect("staging dir");
    let private = TempDir::new().expect("private dir");

    // Unreachable on purpose; no test below may depend on a live node.
    let gateway_config = ChainGatewayConfig::builder()
        .rpc_url("http://127.0.0.1:9".parse().expect("valid url"))
        .signer_key("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_owned())
        .chain_id(31337)
        .registry_address(Address::from_low_u64_be(0xaa))
        .dao_address(Address::from_low_u64_be(0xbb))
        .gas_price_gwei(30)
        .receipt_timeout(Duration::from_secs(1))
        .build();

    let custody =
        FileCustody::open(staging.path(), private.path()).await.expect("custody must open");

    let app = App::builder()
        .gateway(ChainGateway::connect(gateway_config).expect("gateway must build").into())
        .auth(WalletAuth::new(JWT_SECRET).expect("auth must build").into())
        .custody(custody.into())
        .admins(Arc::new(admins.iter().copied().collect::<HashSet<_>>()))
        .secure_cookies(false)
        .upload_limit(upload_limit)
        .build();

    TestServer { router: create_router(app), _staging: staging, _private: private }
}

async fn login(router: &Router, wallet: &LocalWallet) -> String {
    let address = checksum_hex(wallet_address(wallet));

    let response = router
        .clone()
        .oneshot(json_request("POST", "/auth/nonce", json!({ "address": address })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let nonce = json_body(response).await["nonce"].as_str().expect("nonce field").to_owned();

    let signature = personal_sign(wallet, &format!("{SIGN_MESSAGE_PREFIX}{nonce}")).await;
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/verify",
            json!({ "address": address, "signature": signature }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("cookie text")
        .to_owned();

    set_cookie.split(';').next().expect("cookie pair").to_owned()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request must build")
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_owned());
    }

    builder.body(Body::empty()).expect("request must build")
}

fn multipart_request(
    cookie: Option<&str>,
    filename: &str,
    media_type: &str,
    content: &[u8],
) -> Request<Body> {
    let party_b = checksum_hex(Address::from_low_u64_be(0x77));

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: {media_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(
        format!(
            "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"asset_id\"\r\n\r\n\
             ASSET-001\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; \
             name=\"party_b\"\r\n\r\n{party_b}\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie.to_owned());
    }

    builder.body(Body::from(body)).expect("request must build")
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.expect("body must collect").to_bytes();

    serde_json::from_slice(&bytes).expect("body must be json")
}
