use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse},
};
use trade_registry_utils::{checksum_hex, parse_wallet_address};

use crate::{
    App, AppDissolved,
    error::AppError,
    payload::{
        request::{
            NonceRequestPayload, NonceRequestPayloadDissolved, VerifyRequestPayload,
            VerifyRequestPayloadDissolved,
        },
        response::{MeResponsePayload, MessageResponsePayload, NonceResponsePayload},
    },
    session,
};

#[tracing::instrument(skip_all)]
pub async fn request_nonce(
    State(app): State<App>,
    Json(payload): Json<NonceRequestPayload>,
) -> Result<Json<NonceResponsePayload>, AppError> {
    let AppDissolved { auth, .. } = app.dissolve();

    let NonceRequestPayloadDissolved { address } = payload.dissolve();
    let address = parse_wallet_address(&address)?;

    let nonce = auth.request_nonce(address);

    Ok(Json(NonceResponsePayload::builder().nonce(nonce).build()))
}

#[tracing::instrument(skip_all)]
pub async fn verify_signature(
    State(app): State<App>,
    Json(payload): Json<VerifyRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let AppDissolved { auth, secure_cookies, .. } = app.dissolve();

    let VerifyRequestPayloadDissolved { address, signature } = payload.dissolve();
    let address = parse_wallet_address(&address)?;

    let token = auth
        .verify_signature(address, &signature)
        .inspect_err(|e| tracing::warn!("signature verification failed: {e}"))?;

    let cookie = AppendHeaders([(header::SET_COOKIE, session::login_cookie(&token, secure_cookies))]);
    let response = MessageResponsePayload::builder().message("Login successful".to_owned()).build();

    Ok((cookie, Json(response)))
}

#[tracing::instrument(skip_all)]
pub async fn logout() -> impl IntoResponse {
    let cookie = AppendHeaders([(header::SET_COOKIE, session::logout_cookie())]);
    let response =
        MessageResponsePayload::builder().message("Logout successful".to_owned()).build();

    (cookie, Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn me(
    State(app): State<App>,
    headers: HeaderMap,
) -> Result<Json<MeResponsePayload>, AppError> {
    let AppDissolved { auth, .. } = app.dissolve();

    let address = session::authenticate(&auth, &headers)?;

    Ok(Json(MeResponsePayload::builder().address(checksum_hex(address)).build()))
}
