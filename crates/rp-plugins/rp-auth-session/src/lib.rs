//! # rp-auth-session
//!
//! Argon2-based implementation of `AuthProvider`.
//! Passwords are stored as PHC strings; sessions are stateless HMAC-signed
//! cookie tokens of the form `<user_id>.<expiry_unix>.<signature>`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rp_core::traits::AuthProvider;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub struct SessionAuthProvider {
    /// Secret for session signatures (e.g., from RP_SESSION_SECRET).
    secret: Vec<u8>,
    session_ttl_secs: i64,
}

impl SessionAuthProvider {
    pub fn new(secret: &str, session_ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            session_ttl_secs,
        }
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl AuthProvider for SessionAuthProvider {
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn issue_session(&self, user_id: Uuid) -> String {
        let expires = Utc::now().timestamp() + self.session_ttl_secs;
        let payload = format!("{user_id}.{expires}");
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    fn verify_session(&self, token: &str) -> Option<Uuid> {
        let mut parts = token.splitn(3, '.');
        let user_id = parts.next()?.parse::<Uuid>().ok()?;
        let expires = parts.next()?.parse::<i64>().ok()?;
        let signature = parts.next()?;

        let payload = format!("{user_id}.{expires}");
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        let expected = hex::decode(signature).ok()?;
        mac.verify_slice(&expected).ok()?;

        if expires <= Utc::now().timestamp() {
            return None;
        }
        Some(user_id)
    }
}
