//! Single-admin authentication and flash messages.
//!
//! Session state lives entirely client-side in one signed cookie, so nothing
//! accumulates on the server and a restart keeps the admin logged in. A cookie
//! whose signature does not match reads as an empty session.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tower_cookies::{cookie::SameSite, Cookie, Cookies, Key};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::state::AppState;

const SESSION_COOKIE: &str = "session";

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Signing key for the session cookie, stretched from the configured secret.
pub fn session_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(&digest[..])
}

/// Both fields are always compared so a failure says nothing about which one
/// was wrong.
pub fn check_credentials(config: &Config, username: &str, password: &str) -> bool {
    let user_ok = username == config.username;
    let pass_ok = password == config.password;
    user_ok & pass_ok
}

/// Everything stored in the session cookie.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub flashes: Vec<String>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        !self.logged_in && self.flashes.is_empty()
    }

    fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(urlencoding::encode(&json).into_owned())
    }

    fn decode(value: &str) -> Option<Self> {
        let json = urlencoding::decode(value).ok()?;
        serde_json::from_str(&json).ok()
    }
}

/// The request's session. Every change is written back to the cookie jar
/// straight away and goes out with the response.
pub struct Session {
    cookies: Cookies,
    key: Key,
    data: SessionData,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.data.logged_in
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&mut self, message: &str) -> Result<()> {
        self.data.flashes.push(message.to_string());
        self.save()
    }

    /// Drain all queued messages.
    pub fn take_flashes(&mut self) -> Result<Vec<String>> {
        if self.data.flashes.is_empty() {
            return Ok(Vec::new());
        }
        let flashes = std::mem::take(&mut self.data.flashes);
        self.save()?;
        Ok(flashes)
    }

    fn set_logged_in(&mut self, logged_in: bool) -> Result<()> {
        self.data.logged_in = logged_in;
        self.save()
    }

    fn save(&self) -> Result<()> {
        let signed = self.cookies.signed(&self.key);
        if self.data.is_empty() {
            signed.remove(session_cookie(String::new()));
        } else {
            signed.add(session_cookie(self.data.encode()?));
        }
        Ok(())
    }
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::SessionUnavailable)?;

        let data = cookies
            .signed(&state.session_key)
            .get(SESSION_COOKIE)
            .and_then(|cookie| SessionData::decode(cookie.value()))
            .unwrap_or_default();

        Ok(Session {
            cookies,
            key: state.session_key.clone(),
            data,
        })
    }
}

/// Sets the session flag on a full match. Returns whether the login succeeded.
pub fn login(session: &mut Session, config: &Config, username: &str, password: &str) -> Result<bool> {
    if !check_credentials(config, username, password) {
        warn!("Rejected login attempt");
        return Ok(false);
    }

    session.set_logged_in(true)?;
    info!("Admin logged in");
    Ok(true)
}

/// Clears the session flag. Safe to call when not logged in.
pub fn logout(session: &mut Session) -> Result<()> {
    session.set_logged_in(false)
}

/// Guard for admin-only routes. Extraction fails with
/// [`AppError::Unauthorized`] before the handler body runs.
pub struct RequireLogin;

#[async_trait]
impl FromRequestParts<AppState> for RequireLogin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let session = Session::from_request_parts(parts, state).await?;

        if session.is_logged_in() {
            Ok(RequireLogin)
        } else {
            warn!("Unauthorized request to {}", parts.uri.path());
            Err(AppError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_need_both_fields() {
        let config = Config::default();

        assert!(check_credentials(&config, "admin", "default"));
        assert!(!check_credentials(&config, "adminx", "default"));
        assert!(!check_credentials(&config, "admin", "defaultx"));
        assert!(!check_credentials(&config, "", ""));
    }

    #[test]
    fn short_secret_still_yields_a_key() {
        let a = session_key("dev key");
        let b = session_key("dev key");
        let c = session_key("other");

        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }

    #[test]
    fn session_data_survives_the_cookie() {
        let data = SessionData {
            logged_in: true,
            flashes: vec!["Quotes \"; and, commas = fine".to_string()],
        };

        let value = data.encode().unwrap();
        assert!(!value.contains(';'));
        assert_eq!(SessionData::decode(&value), Some(data));
    }

    #[test]
    fn garbage_cookie_is_no_session() {
        assert_eq!(SessionData::decode("not json"), None);
        assert!(SessionData::default().is_empty());
    }
}
