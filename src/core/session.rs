//! Signed session cookie.
//!
//! Token layout: `base64url(json payload) "." hex(HMAC-SHA256(secret, payload))`.
//! The payload carries `isLoggedIn` and an `exp` unix timestamp; expiry lives
//! entirely in the token and the cookie's `Max-Age`, nothing is kept server-side.

use crate::errors::{AppError, AppResult};
use axum::http::{HeaderMap, header::COOKIE};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

pub const COOKIE_NAME: &str = "timesheet-session";
pub const MIN_SECRET_LEN: usize = 32;
/// One year.
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_logged_in: bool,
    pub exp: i64,
}

pub struct SessionSealer {
    mac: HmacSha256,
    ttl_secs: u64,
}

impl SessionSealer {
    pub fn new(secret: &str, ttl_secs: u64) -> AppResult<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "SESSION_SECRET must be at least {} bytes long",
                MIN_SECRET_LEN
            )));
        }
        if ttl_secs <= 60 || ttl_secs > MAX_TTL_SECS {
            return Err(AppError::Config(format!(
                "session_ttl_secs must be greater than 60 and at most {MAX_TTL_SECS}"
            )));
        }

        let mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid SESSION_SECRET: {e}")))?;

        Ok(Self { mac, ttl_secs })
    }

    pub fn login_session(&self, now: DateTime<Utc>) -> AppResult<Session> {
        let exp = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(|ttl| now.timestamp().checked_add(ttl))
            .ok_or_else(|| AppError::Other("session expiry out of range".into()))?;

        Ok(Session {
            is_logged_in: true,
            exp,
        })
    }

    pub fn seal(&self, session: &Session) -> AppResult<String> {
        let json = serde_json::to_vec(session)
            .map_err(|e| AppError::Other(format!("session encoding failed: {e}")))?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{sig}"))
    }

    /// Verify signature and expiry; `None` for anything that does not check out.
    pub fn unseal(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let (payload, sig) = token.split_once('.')?;
        let sig = hex::decode(sig).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig).ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let session: Session = serde_json::from_slice(&json).ok()?;

        (session.exp > now.timestamp()).then_some(session)
    }

    /// `Set-Cookie` value for a freshly sealed token.
    ///
    /// The cookie expires a minute before the token so the browser never
    /// presents a token the server would consider stale.
    pub fn set_cookie(&self, token: &str) -> String {
        format!(
            "{COOKIE_NAME}={token}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
            self.ttl_secs - 60
        )
    }
}

/// Value of the named cookie across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}
