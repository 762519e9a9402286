//! PBKDF2-SHA256 password hashing in the Django-style format
//! `pbkdf2_sha256$<iterations>$<salt>$<base64 hash>`.

use base64::{engine::general_purpose, Engine as _};
use constant_time_eq::constant_time_eq;
use pbkdf2::hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::Sha256;

const ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 22;
const HASH_LEN: usize = 32;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    let derived = derive(password, &salt, ITERATIONS);
    format!(
        "pbkdf2_sha256${}${}${}",
        ITERATIONS,
        salt,
        general_purpose::STANDARD.encode(derived)
    )
}

/// Verify a plaintext password against a stored hash string.
/// Unknown formats verify false; the comparison is constant-time.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != "pbkdf2_sha256" {
        return false;
    }
    let iterations: u32 = match parts[1].parse() {
        Ok(i) => i,
        Err(_) => return false,
    };
    let salt = parts[2];
    let expected = parts[3];
    let derived = derive(password, salt, iterations);
    let computed = general_purpose::STANDARD.encode(derived);
    constant_time_eq(computed.as_bytes(), expected.as_bytes())
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; HASH_LEN] {
    let mut output = [0u8; HASH_LEN];
    // Only fails on an invalid output length, which is fixed here.
    pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt.as_bytes(), iterations, &mut output).unwrap();
    output
}
