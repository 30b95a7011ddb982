// server/src/utils/token.rs
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a cryptographically secure random token of specified length
pub fn generate_secure_token(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Create an opaque session identifier with timestamp-mixed entropy
pub fn create_session_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    let random_part = generate_secure_token(32);
    let mut hasher = Sha256::new();
    hasher.update(format!("{}-{}", timestamp, random_part).as_bytes());
    hex::encode(hasher.finalize())
}

/// One-way digest for stored passwords
pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a candidate password against a stored digest
pub fn verify_password(digest: &str, password: &str) -> bool {
    digest_password(password) == digest
}
