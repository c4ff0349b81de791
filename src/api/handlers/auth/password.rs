//! Argon2 password hashing.
//!
//! Hashing and verification are CPU-bound, so the async wrappers move them to
//! the blocking pool.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hash `password` into a PHC string with a fresh random salt.
///
/// # Errors
/// Returns an error if argon2 rejects the input or parameters.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(phc.to_string())
}

/// Check `password` against a stored PHC string. Unparseable hashes never match.
#[must_use]
pub fn verify_password(password: &str, hashed: &str) -> bool {
    PasswordHash::new(hashed).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

pub(crate) async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")?
}

pub(crate) async fn verify(password: String, hashed: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
        .await
        .context("password verification task failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_one_way_and_verifies() -> Result<()> {
        let hashed = hash_password("1234")?;
        assert_ne!(hashed, "1234");
        assert!(hashed.starts_with("$argon2"));
        assert!(verify_password("1234", &hashed));
        Ok(())
    }

    #[test]
    fn wrong_passwords_do_not_verify() -> Result<()> {
        let pairs = [
            ("1234", "12345"),
            ("password", "Password"),
            ("abc", ""),
            ("s3cr3t", "s3cr3t "),
        ];
        for (plaintext, wrong) in pairs {
            let hashed = hash_password(plaintext)?;
            assert!(verify_password(plaintext, &hashed));
            assert!(!verify_password(wrong, &hashed));
        }
        Ok(())
    }

    #[test]
    fn same_password_hashes_differently() -> Result<()> {
        assert_ne!(hash_password("1234")?, hash_password("1234")?);
        Ok(())
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password("1234", "1234"));
        assert!(!verify_password("1234", ""));
    }

    #[tokio::test]
    async fn async_wrappers_round_trip() -> Result<()> {
        let hashed = hash("1234".to_string()).await?;
        assert!(verify("1234".to_string(), hashed.clone()).await?);
        assert!(!verify("4321".to_string(), hashed).await?);
        Ok(())
    }
}
