//! Authentication and session management.
//!
//! Authentication is optional and enabled by setting AINOTES_PASSWORD. Every
//! user logs in with a name of their choosing plus the shared password; the
//! name scopes which chats they see. Sessions are HMAC-signed cookies that
//! carry the user name and an expiry. With authentication off, every request
//! acts as [`LOCAL_USER`].

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum_extra::extract::CookieJar;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Session cookie name
pub const SESSION_COOKIE: &str = "ainotes_session";

/// Session time-to-live in hours
pub const SESSION_TTL_HOURS: i64 = 24;

/// Owner of every record when authentication is disabled.
pub const LOCAL_USER: &str = "local";

const MAX_USERNAME_LEN: usize = 64;

// ============================================================================
// Session Structure
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    user: String,
    created: i64,
    expires: i64,
    nonce: String,
}

// ============================================================================
// Authenticator
// ============================================================================

pub struct Authenticator {
    secret: Vec<u8>,
    password_hash: String,
}

impl Authenticator {
    /// Hashes the shared password once (Argon2id, roughly 100ms).
    pub fn new(password: &str) -> Result<Self> {
        Ok(Self {
            secret: password.as_bytes().to_vec(),
            password_hash: hash_password(password)?,
        })
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn create_session(&self, user: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let nonce: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();

        let session = Session {
            user: user.to_string(),
            created: now,
            expires: now + SESSION_TTL_HOURS * 3600,
            nonce,
        };
        let session_json = serde_json::to_string(&session)?;

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(session_json.as_bytes()),
            self.sign(session_json.as_bytes())?
        ))
    }

    /// Returns the session's user if the token is authentic and unexpired.
    pub fn verify_session(&self, token: &str) -> Option<String> {
        let (payload, signature) = token.split_once('.')?;
        let session_json = URL_SAFE_NO_PAD.decode(payload).ok()?;

        // Constant-time comparison to prevent timing attacks
        let expected = self.sign(&session_json).ok()?;
        if signature.len() != expected.len()
            || signature.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1
        {
            return None;
        }

        let session: Session = serde_json::from_slice(&session_json).ok()?;
        (Utc::now().timestamp() < session.expires).then_some(session.user)
    }

    fn sign(&self, data: &[u8]) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Config(format!("Invalid session key: {}", e)))?;
        mac.update(data);
        Ok(hex_encode(mac.finalize().into_bytes().as_slice()))
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Config(format!("Failed to hash password: {}", e)))
}

// ============================================================================
// Request Helpers
// ============================================================================

/// The user a request acts as, or `None` when it must log in first.
pub fn current_user(jar: &CookieJar, auth: Option<&Authenticator>) -> Option<String> {
    match auth {
        None => Some(LOCAL_USER.to_string()),
        Some(auth) => jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| auth.verify_session(cookie.value())),
    }
}

/// Trims and checks a login name.
pub fn normalize_username(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("user name is required".to_string()));
    }
    if name.chars().count() > MAX_USERNAME_LEN
        || !name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(Error::InvalidInput(
            "user name may only contain letters, digits, '-', '_' and '.'".to_string(),
        ));
    }
    Ok(name.to_string())
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL_HOURS * 3600
    )
}

pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Encode bytes as hexadecimal
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_password_verification() {
        let auth = Authenticator::new("hunter2").unwrap();
        assert!(auth.verify_password("hunter2"));
        assert!(!auth.verify_password("hunter3"));
        assert!(!auth.verify_password(""));
    }

    #[test]
    fn test_session_roundtrip_carries_user() {
        let auth = Authenticator::new("pw").unwrap();
        let token = auth.create_session("ann").unwrap();
        assert_eq!(auth.verify_session(&token).as_deref(), Some("ann"));
    }

    #[test]
    fn test_tampered_or_foreign_session_rejected() {
        let auth = Authenticator::new("pw").unwrap();
        let token = auth.create_session("ann").unwrap();

        let (_, sig) = token.split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            r#"{"user":"bob","created":0,"expires":99999999999,"nonce":"x"}"#,
        );
        assert!(auth.verify_session(&format!("{}.{}", forged_payload, sig)).is_none());

        let other = Authenticator::new("different").unwrap();
        assert!(other.verify_session(&token).is_none());
        assert!(auth.verify_session("garbage").is_none());
    }

    #[test]
    fn test_current_user_without_auth_is_local() {
        let jar = CookieJar::new();
        assert_eq!(current_user(&jar, None).as_deref(), Some(LOCAL_USER));
    }

    #[test]
    fn test_current_user_reads_cookie() {
        let auth = Authenticator::new("pw").unwrap();
        assert!(current_user(&CookieJar::new(), Some(&auth)).is_none());

        let token = auth.create_session("ann").unwrap();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        assert_eq!(current_user(&jar, Some(&auth)).as_deref(), Some("ann"));
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(normalize_username("  ann ").unwrap(), "ann");
        assert!(normalize_username("").is_err());
        assert!(normalize_username("a b").is_err());
        assert!(normalize_username("<script>").is_err());
        assert!(normalize_username(&"x".repeat(65)).is_err());
    }
}
