//! Clinician password and session token handling
//!
//! Two values in cardima are secret: the password sent to `/auth/login` and
//! the bearer token it returns, which is also persisted between runs. Both
//! travel as [`SecretString`]. Neither shows up in `Debug` output or in
//! tracing fields, and each is wiped from memory when dropped.
//!
//! ```rust
//! use cardima::config::session_token;
//! use secrecy::ExposeSecret;
//!
//! let token = session_token("eyJhbGciOi...\n").unwrap();
//! assert_eq!(token.expose_secret(), "eyJhbGciOi...");
//! assert!(!format!("{token:?}").contains("eyJ"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String payload of a [`SecretString`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

pub type SecretString = Secret<SecretValue>;

#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Parse a bearer token as read from the token file or a terminal
///
/// Surrounding whitespace (a trailing newline, typically) is dropped; a
/// blank token means there is no session.
pub fn session_token(raw: &str) -> Option<SecretString> {
    let token = raw.trim();
    (!token.is_empty()).then(|| secret_string(token.to_string()))
}
