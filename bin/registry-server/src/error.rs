use std::borrow::Cow;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use trade_registry_auth::AuthError;
use trade_registry_domain::TradeIdError;
use trade_registry_engine::ChainError;
use trade_registry_store::CustodyError;
use trade_registry_utils::WalletAddressError;

#[derive(Debug, thiserror::Error)]
pub(crate) enum AppError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("administrator privileges required")]
    NotAdmin,

    #[error("only PDF files are accepted")]
    NotPdfExtension,

    #[error("missing multipart field: {0}")]
    MissingField(&'static str),

    #[error("invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("invalid wallet address: {0}")]
    InvalidAddress(#[from] WalletAddressError),

    #[error("invalid trade id: {0}")]
    InvalidTradeId(#[from] TradeIdError),

    #[error("file custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("other error: {0}")]
    Other(Cow<'static, str>),
}

impl AppError {
    pub fn other<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::Other(err.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            // A signature that cannot be decoded is bad input, not a failed
            // proof.
            AppError::Auth(AuthError::MalformedSignature(_)) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotAdmin => StatusCode::FORBIDDEN,
            AppError::NotPdfExtension
            | AppError::MissingField(_)
            | AppError::InvalidAddress(_)
            | AppError::InvalidTradeId(_)
            | AppError::Custody(CustodyError::NotPdf | CustodyError::WrongMediaType(_))
            | AppError::Chain(
                ChainError::NoVotesCast(_)
                | ChainError::TxMismatch { .. }
                | ChainError::MalformedTxHash(_),
            ) => StatusCode::BAD_REQUEST,
            AppError::Multipart(err) => err.status(),
            AppError::Custody(CustodyError::NotFound(_))
            | AppError::Chain(ChainError::TradeNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Custody(_) | AppError::Chain(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

/// The error body every failed request carries: `{"detail": "..."}`.
#[derive(Serialize)]
struct ErrorDetail {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status_code();

        if code.is_server_error() {
            tracing::error!("server error: {self}");
        } else if code == StatusCode::NOT_FOUND {
            tracing::info!("not found: {self}");
        } else {
            tracing::warn!("client error: {self}");
        }

        (code, Json(ErrorDetail { detail: self.to_string() })).into_response()
    }
}
