use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ring::rand::{SecureRandom, SystemRandom};
use ring::{digest, pbkdf2};
use std::num::NonZeroU32;
use thiserror::Error;

const ALGORITHM_NAME: &str = "pbkdf2_sha256";
const ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = digest::SHA256_OUTPUT_LEN;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to generate salt")]
    Random,
}

/// Hashes a password as `pbkdf2_sha256$<iterations>$<salt>$<hash>` with base64 parts.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_with_iterations(password, ITERATIONS)
}

fn hash_with_iterations(password: &str, iterations: u32) -> Result<String, PasswordError> {
    let iterations = NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN);
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new().fill(&mut salt).map_err(|_| PasswordError::Random)?;

    let mut credential = [0u8; CREDENTIAL_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &mut credential,
    );
    Ok(format!(
        "{ALGORITHM_NAME}${iterations}${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(credential)
    ))
}

/// Malformed or empty hashes never verify.
#[must_use]
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(ALGORITHM_NAME), Some(iterations), Some(salt), Some(hash), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (STANDARD.decode(salt), STANDARD.decode(hash)) else {
        return false;
    };
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_with_iterations("correct horse", 1_000).unwrap();
        assert!(hash.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_salted() {
        let first = hash_with_iterations("secret", 1_000).unwrap();
        let second = hash_with_iterations("secret", 1_000).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hashes() {
        assert!(!verify_password("secret", ""));
        assert!(!verify_password("secret", "md5$1$abc$def"));
        assert!(!verify_password("secret", "pbkdf2_sha256$0$AAAA$AAAA"));
        assert!(!verify_password("secret", "pbkdf2_sha256$10$!!$AAAA"));
    }
}
