use crate::errors::AppError;
use crate::models::User;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use tracing::warn;

pub const TOKEN_COOKIE: &str = "token";
pub const USER_COOKIE: &str = "user";

/// Credential and identity carried by the browser's cookies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn from_cookie_header(header: &str) -> Self {
        let cookies = parse_cookies(header);

        let token = cookies
            .get(TOKEN_COOKIE)
            .filter(|token| !token.is_empty())
            .map(|token| token.to_string());

        let user = cookies.get(USER_COOKIE).and_then(|raw| parse_user(raw));

        Self { token, user }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Drops the credential and identity and returns the `Set-Cookie` values
    /// that expire both cookies in the browser.
    pub fn logout(&mut self) -> [String; 2] {
        self.token = None;
        self.user = None;
        [expired_cookie(TOKEN_COOKIE), expired_cookie(USER_COOKIE)]
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mut session = Session::default();
        // Browsers may split cookies over several headers.
        for value in parts.headers.get_all(header::COOKIE) {
            let Ok(value) = value.to_str() else {
                warn!("ignoring non-ascii cookie header");
                continue;
            };
            let parsed = Session::from_cookie_header(value);
            session.token = session.token.or(parsed.token);
            session.user = session.user.or(parsed.user);
        }
        Ok(session)
    }
}

fn parse_cookies(header: &str) -> HashMap<&str, &str> {
    header
        .split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            if pair.is_empty() {
                return None;
            }
            match pair.split_once('=') {
                Some((key, value)) => Some((key.trim(), value.trim())),
                None => Some((pair, "")),
            }
        })
        .collect()
}

fn parse_user(raw: &str) -> Option<User> {
    let decoded = match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!("failed to decode user cookie: {err}");
            return None;
        }
    };
    match serde_json::from_str(&decoded) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!("failed to parse user from cookie: {err}");
            None
        }
    }
}

fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "%7B%22id%22%3A%22u1%22%2C%22username%22%3A%22ada%22%2C%22role%22%3A%22user%22%7D";

    #[test]
    fn reads_token_and_user() {
        let session = Session::from_cookie_header(&format!("theme=dark; token=abc.def; user={USER}"));
        assert_eq!(session.token(), Some("abc.def"));
        let user = session.user().expect("user");
        assert_eq!(user.username, "ada");
        assert_eq!(user.role, "user");
        assert!(session.is_authenticated());
    }

    #[test]
    fn token_keeps_embedded_equals_signs() {
        let session = Session::from_cookie_header("token=abc==");
        assert_eq!(session.token(), Some("abc=="));
    }

    #[test]
    fn malformed_user_is_discarded() {
        let session = Session::from_cookie_header("token=t; user=%7Bnot-json");
        assert_eq!(session.token(), Some("t"));
        assert!(session.user().is_none());
    }

    #[test]
    fn missing_or_empty_token_means_no_session() {
        assert!(!Session::from_cookie_header("").is_authenticated());
        assert!(!Session::from_cookie_header("token=; user=").is_authenticated());
        assert!(!Session::from_cookie_header("other=1;;").is_authenticated());
    }

    #[test]
    fn logout_clears_memory_and_expires_cookies() {
        let mut session = Session::from_cookie_header(&format!("token=t; user={USER}"));
        let cookies = session.logout();
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
        assert_eq!(cookies[0], "token=; Path=/; Max-Age=0");
        assert_eq!(cookies[1], "user=; Path=/; Max-Age=0");
        assert_eq!(session, Session::default());
    }
}
