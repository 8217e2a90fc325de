//! Authentication state of a single Web UI session.
//!
//! The session owns the cookie handed out by `auth.login` and the rolling
//! JSON-RPC message id. It can be exported to plain data and restored in
//! another process to resume the same login.

use chrono::{DateTime, Duration, Utc};
use cookie::Cookie;
use serde::{Deserialize, Serialize};

use crate::error::{DelugeError, Result};

/// Message ids wrap back to 0 once they reach this value.
pub const MESSAGE_ID_CEILING: u32 = 4096;

/// A cookie is treated as expired when less than this much lifetime is left.
pub const COOKIE_EXPIRY_MARGIN_MS: i64 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    /// Absolute expiry; `None` for a browser-session cookie
    pub expires: Option<DateTime<Utc>>,
    pub path: Option<String>,
}

impl SessionCookie {
    /// Parses a `Set-Cookie` header value.
    ///
    /// `Max-Age` wins over `Expires` and is converted to an absolute time
    /// against `now`, so an exported cookie keeps its real deadline.
    pub fn parse(header: &str, now: DateTime<Utc>) -> Result<Self> {
        let cookie =
            Cookie::parse(header).map_err(|_| DelugeError::InvalidCookie(header.to_string()))?;

        let expires = match cookie.max_age() {
            Some(max_age) => Duration::try_seconds(max_age.whole_seconds())
                .and_then(|age| now.checked_add_signed(age)),
            None => cookie
                .expires_datetime()
                .and_then(|expires| DateTime::from_timestamp(expires.unix_timestamp(), 0)),
        };

        Ok(Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            expires,
            path: cookie.path().map(str::to_string),
        })
    }

    /// Remaining lifetime, `None` when the cookie does not expire.
    pub fn ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires.map(|expires| expires - now)
    }

    /// Value for the `Cookie` request header.
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Local validity of the stored cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieCheck {
    Missing,
    Expiring,
    Valid,
    /// Cookie present without an expiry, only the daemon can tell
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    cookie: Option<SessionCookie>,
    message_id: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the cookie and zeroes the message id.
    pub fn reset(&mut self) {
        self.cookie = None;
        self.message_id = 0;
    }

    pub fn cookie(&self) -> Option<&SessionCookie> {
        self.cookie.as_ref()
    }

    pub fn set_cookie(&mut self, cookie: SessionCookie) {
        self.cookie = Some(cookie);
    }

    pub fn message_id(&self) -> u32 {
        self.message_id
    }

    /// Returns the id for the next request and advances the counter.
    pub fn next_message_id(&mut self) -> u32 {
        if self.message_id >= MESSAGE_ID_CEILING {
            self.message_id = 0;
        }
        let id = self.message_id;
        self.message_id += 1;
        id
    }

    pub fn check_cookie(&self, now: DateTime<Utc>) -> CookieCheck {
        let Some(cookie) = &self.cookie else {
            return CookieCheck::Missing;
        };
        match cookie.ttl(now) {
            None => CookieCheck::Unknown,
            Some(ttl) if ttl.num_milliseconds() < COOKIE_EXPIRY_MARGIN_MS => {
                CookieCheck::Expiring
            }
            Some(_) => CookieCheck::Valid,
        }
    }

    pub fn export(&self) -> SessionSnapshot {
        SessionSnapshot {
            auth: self.cookie.clone().map(|cookie| AuthSnapshot {
                cookie,
                message_id: self.message_id,
            }),
        }
    }

    /// Rebuilds a session; a snapshot without auth yields a fresh session.
    pub fn import(snapshot: SessionSnapshot) -> Self {
        match snapshot.auth {
            Some(auth) => Self {
                cookie: Some(auth.cookie),
                message_id: auth.message_id,
            },
            None => Self::default(),
        }
    }
}

/// Serializable form of a [`Session`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub auth: Option<AuthSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSnapshot {
    pub cookie: SessionCookie,
    #[serde(default)]
    pub message_id: u32,
}
