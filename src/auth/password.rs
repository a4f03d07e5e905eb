//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use rand::{distributions::Alphanumeric, Rng};

/// Length of generated placeholder passwords
const PLACEHOLDER_PASSWORD_LEN: usize = 32;

/// Password hasher with configurable parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher from explicit Argon2 parameters
    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// Create hasher from the security section of the config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self::with_params(params))
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// A wrong password is `Ok(false)`; only a stored hash that cannot be
    /// parsed is an error. Cost parameters are read from the hash itself.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Failed to parse stored password hash: {:?}", e);
            AppError::Internal(format!("Failed to parse password hash: {}", e))
        })?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash on the blocking pool so request workers are not stalled
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    /// Verify on the blocking pool
    pub async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }

    /// Random secret for accounts created without a user-chosen password.
    /// Must be reset before the account is used interactively.
    pub fn generate_placeholder_password() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PLACEHOLDER_PASSWORD_LEN)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap())
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hasher.verify(password, &hash).unwrap());
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = fast_hasher();

        let hash = hasher.hash("TestPassword123!").unwrap();
        assert!(!hasher.verify("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        // Hashes should be different due to salt
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        let hasher = fast_hasher();
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_placeholder_password() {
        let a = PasswordHasher::generate_placeholder_password();
        let b = PasswordHasher::generate_placeholder_password();

        assert_eq!(a.len(), PLACEHOLDER_PASSWORD_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hasher = fast_hasher();

        let hash = hasher.hash_blocking("secret".to_string()).await.unwrap();
        assert!(hasher
            .verify_blocking("secret".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!hasher
            .verify_blocking("other".to_string(), hash)
            .await
            .unwrap());
    }
}
