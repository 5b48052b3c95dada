//! Password hashing and verification.
//!
//! Hashes are stored as `pbkdf2:iterations:hex_salt:hex_hash` so the
//! iteration count can be raised later without invalidating existing rows.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const ITERATIONS: u32 = 600_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// Hash a plaintext password with PBKDF2-HMAC-SHA256 and a random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ITERATIONS, &mut hash);

    format!(
        "pbkdf2:{}:{}:{}",
        ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    )
}

/// Verify a plaintext password against a stored hash string.
///
/// Returns false for malformed hashes rather than erroring; a corrupt row
/// should read as "wrong password", not take the login endpoint down.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split(':');
    let (scheme, iterations, salt_hex, hash_hex) = match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some(s), Some(i), Some(salt), Some(hash)) => (s, i, salt, hash),
        _ => return false,
    };

    if scheme != "pbkdf2" || parts.next().is_some() {
        return false;
    }

    let iterations: u32 = match iterations.parse() {
        Ok(i) => i,
        Err(_) => return false,
    };
    let salt = match hex::decode(salt_hex) {
        Ok(s) => s,
        Err(_) => return false,
    };
    let expected = match hex::decode(hash_hex) {
        Ok(h) => h,
        Err(_) => return false,
    };

    let mut computed = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut computed);

    constant_time_eq(&computed, &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
