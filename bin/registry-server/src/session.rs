//! Session cookie plumbing shared by the protected routes.

use std::collections::HashSet;

use axum::http::{HeaderMap, header};
use ethers::types::Address;
use trade_registry_auth::{AuthError, SESSION_TTL_SECS, WalletAuth};

use crate::error::AppError;

/// Name of the cookie that carries the session token.
pub(crate) const SESSION_COOKIE: &str = "access_token";

/// Builds the `Set-Cookie` value for a fresh login.
pub(crate) fn login_cookie(token: &str, secure: bool) -> String {
    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}; Path=/"
    );

    if secure { format!("{cookie}; Secure") } else { cookie }
}

/// Builds the `Set-Cookie` value that discards the session cookie.
///
/// Logout only clears the cookie; the token itself stays valid until its
/// natural expiry.
pub(crate) fn logout_cookie() -> String {
    format!("{SESSION_COOKIE}=; Max-Age=0; Path=/")
}

/// Authenticates the request from its session cookie and returns the wallet
/// address the session grants.
pub(crate) fn authenticate(auth: &WalletAuth, headers: &HeaderMap) -> Result<Address, AppError> {
    let token = extract_token(headers).ok_or(AuthError::MissingToken)?;

    Ok(auth.validate_session(token)?)
}

/// Checks the wallet against the admin allow-list.
pub(crate) fn authorize_admin(
    admins: &HashSet<Address>,
    address: Address,
) -> Result<(), AppError> {
    admins.contains(&address).then_some(()).ok_or(AppError::NotAdmin)
}

/// Pulls the session token out of the request's `Cookie` header.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(name, value)| (name == SESSION_COOKIE).then_some(value))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; lang=en"),
        );

        assert_eq!(extract_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn absent_cookie_header_yields_no_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));

        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn login_cookie_carries_the_session_flags() {
        let cookie = login_cookie("tok", false);

        assert!(cookie.starts_with("access_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        assert!(login_cookie("tok", true).ends_with("; Secure"));
    }

    #[test]
    fn logout_cookie_expires_immediately() {
        assert_eq!(logout_cookie(), "access_token=; Max-Age=0; Path=/");
    }
}
