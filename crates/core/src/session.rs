//! Mock login: a single local record standing in for a real session.
//!
//! Nothing is authenticated. A syntactically plausible email and a password
//! of at least six characters are enough to "log in"; the record lives under
//! one storage key until logout.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key of the session record.
pub const SESSION_KEY: &str = "nox.session";

/// Minimum password length in UTF-16 code units, as a browser counts it.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Shown when the form fails validation.
pub const INVALID_MESSAGE: &str = "Verifique email e senha (mín. 6 caracteres).";
/// Shown right after a successful login.
pub const WELCOME_MESSAGE: &str = "Bem-vindo(a). Você já pode falar com a Noxie.";

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("static email pattern"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage (browser `localStorage`, a file, a map).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store, for tests and hosts without persistent storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The persisted record: `{ "email": ..., "at": <epoch millis> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockSession {
    pub email: String,
    #[serde(default)]
    pub at: i64,
}

/// Validated form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
}

/// Trim the email and check both fields.
pub fn validate(email: &str, password: &str) -> Result<Credentials, LoginError> {
    let email = email.trim();
    let email_ok = EMAIL_PATTERN.is_match(email);
    let password_ok = password.encode_utf16().count() >= MIN_PASSWORD_LEN;
    if !email_ok || !password_ok {
        return Err(LoginError::InvalidCredentials);
    }
    Ok(Credentials {
        email: email.to_string(),
    })
}

/// What the session area of the page should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub message: String,
    pub logout_visible: bool,
}

impl SessionStatus {
    pub fn for_session(session: Option<&MockSession>) -> Self {
        match session {
            Some(s) if !s.email.is_empty() => Self {
                message: format!("Olá, {}. Sessão ativa.", s.email),
                logout_visible: true,
            },
            _ => Self {
                message: String::new(),
                logout_visible: false,
            },
        }
    }
}

pub struct SessionManager<S> {
    store: S,
}

impl<S: KeyValueStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored session. Missing, unreadable or malformed records all read
    /// as "no session".
    pub fn current(&self) -> Option<MockSession> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session record");
                return None;
            }
        };
        match serde_json::from_str::<MockSession>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed session record");
                None
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::for_session(self.current().as_ref())
    }

    /// Validate and persist. On error the stored session is left as it was.
    pub fn login(&mut self, email: &str, password: &str, now_ms: i64) -> Result<MockSession, LoginError> {
        let credentials = validate(email, password)?;
        let session = MockSession {
            email: credentials.email,
            at: now_ms,
        };
        let encoded = serde_json::to_string(&session)?;
        self.store.set(SESSION_KEY, &encoded)?;
        tracing::info!(email = %session.email, "mock session started");
        Ok(session)
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.store.remove(SESSION_KEY)?;
        tracing::info!("mock session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager<MemoryStore> {
        SessionManager::new(MemoryStore::default())
    }

    #[test]
    fn valid_login_is_persisted() {
        let mut m = manager();
        let session = m.login("a@b.co", "secret", 1_700_000_000_000).unwrap();
        assert_eq!(session.email, "a@b.co");
        assert_eq!(m.current(), Some(session));
        let raw = m.store().get(SESSION_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"email":"a@b.co","at":1700000000000}"#);
    }

    #[test]
    fn email_is_trimmed() {
        let mut m = manager();
        let session = m.login("  a@b.co \n", "secret", 1).unwrap();
        assert_eq!(session.email, "a@b.co");
    }

    #[test]
    fn short_password_is_rejected() {
        let mut m = manager();
        let err = m.login("a@b.co", "12345", 1).unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
        assert_eq!(m.current(), None);
    }

    #[test]
    fn bad_emails_are_rejected() {
        for email in ["", "ab.co", "a@b", "@b.co", "a@.co", "a@b."] {
            assert!(
                validate(email, "secret").is_err(),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn pattern_is_loose() {
        // `.+@.+\..+` only needs something on each side
        assert!(validate("x@y.z", "123456").is_ok());
        assert!(validate("first.last@sub.domain.org", "123456").is_ok());
    }

    #[test]
    fn password_length_counts_utf16_units() {
        assert!(validate("a@b.co", "ççççç").is_err());
        assert!(validate("a@b.co", "çççççç").is_ok());
        // each emoji is a surrogate pair
        assert!(validate("a@b.co", "😀😀😀").is_ok());
        assert!(validate("a@b.co", "😀😀").is_err());
    }

    #[test]
    fn failed_login_keeps_existing_session() {
        let mut m = manager();
        let first = m.login("a@b.co", "secret", 5).unwrap();
        assert!(m.login("nope", "secret", 6).is_err());
        assert_eq!(m.current(), Some(first));
    }

    #[test]
    fn logout_clears() {
        let mut m = manager();
        m.login("a@b.co", "secret", 5).unwrap();
        m.logout().unwrap();
        assert_eq!(m.current(), None);
        assert_eq!(m.status(), SessionStatus::for_session(None));
    }

    #[test]
    fn malformed_record_reads_as_none() {
        let mut store = MemoryStore::default();
        store.set(SESSION_KEY, "{not json").unwrap();
        let m = SessionManager::new(store);
        assert_eq!(m.current(), None);
        assert!(!m.status().logout_visible);
    }

    #[test]
    fn record_without_timestamp_is_still_a_session() {
        let mut store = MemoryStore::default();
        store.set(SESSION_KEY, r#"{"email":"a@b.co"}"#).unwrap();
        let m = SessionManager::new(store);
        assert_eq!(
            m.current(),
            Some(MockSession {
                email: "a@b.co".into(),
                at: 0,
            })
        );
        assert!(m.status().logout_visible);
    }

    #[test]
    fn status_greets_logged_in_user() {
        let mut m = manager();
        m.login("a@b.co", "secret", 5).unwrap();
        let status = m.status();
        assert_eq!(status.message, "Olá, a@b.co. Sessão ativa.");
        assert!(status.logout_visible);
    }
}
