use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

/// Work factor used for every stored hash.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Input for the hash that unknown-user logins are checked against.
const DUMMY_PASSWORD: &str = "userhub-no-such-user";

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password exceeds {MAX_PASSWORD_BYTES} bytes")]
    TooLong,
    #[error("bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// bcrypt with a fixed cost. Work runs on the blocking pool.
///
/// Holds a throwaway hash at the same cost so a login for a missing user
/// spends as long in bcrypt as one with a wrong password.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Blocks for one bcrypt round; call once at startup.
    pub fn new() -> Result<Self, HashError> {
        Self::build(BCRYPT_COST)
    }

    #[cfg(test)]
    pub fn with_cost(cost: u32) -> Self {
        Self::build(cost).expect("test hasher")
    }

    fn build(cost: u32) -> Result<Self, HashError> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn hash(&self, plain: &str) -> Result<String, HashError> {
        if plain.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::TooLong);
        }
        let plain = plain.to_owned();
        let cost = self.cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
        Ok(hash)
    }

    /// `false` on mismatch, when `plain` is longer than any stored password
    /// can be, and when `hash` is not a bcrypt string.
    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashError> {
        if plain.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash)).await?;
        match outcome {
            Ok(ok) => Ok(ok),
            Err(e) => {
                warn!(error = %e, "stored password hash is unreadable");
                Ok(false)
            }
        }
    }

    /// Runs a full verify against the throwaway hash and discards the result.
    pub async fn verify_dummy(&self, plain: &str) -> Result<(), HashError> {
        let dummy = Arc::clone(&self.dummy_hash);
        self.verify(plain, &dummy).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(4)
    }

    #[tokio::test]
    async fn hash_and_verify_roundtrip() {
        let h = hasher();
        let hash = h.hash("Secur3P@ssw0rd!").await.expect("hashing should succeed");
        assert!(h.verify("Secur3P@ssw0rd!", &hash).await.expect("verify should succeed"));
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let h = hasher();
        let hash = h.hash("correct-horse-battery-staple").await.unwrap();
        assert!(!h.verify("wrong-password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hash_is_self_describing_and_salted() {
        let h = hasher();
        let a = h.hash("secret123").await.unwrap();
        let b = h.hash("secret123").await.unwrap();
        assert!(a.starts_with("$2b$04$"), "{a}");
        assert_ne!(a, b);
        assert!(!a.contains("secret123"));
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch() {
        assert!(!hasher().verify("anything", "not-a-valid-hash").await.unwrap());
    }

    #[tokio::test]
    async fn passwords_past_the_bcrypt_limit_are_refused() {
        let h = hasher();
        let right = format!("{}right", "a".repeat(MAX_PASSWORD_BYTES));
        assert!(matches!(h.hash(&right).await, Err(HashError::TooLong)));

        // Both share the 72-byte prefix that bcrypt would have kept.
        let stored = h.hash(&"a".repeat(MAX_PASSWORD_BYTES)).await.unwrap();
        let wrong = format!("{}WRONG", "a".repeat(MAX_PASSWORD_BYTES));
        assert!(!h.verify(&wrong, &stored).await.unwrap());
    }

    #[tokio::test]
    async fn exactly_72_bytes_is_accepted() {
        let h = hasher();
        let max = "b".repeat(MAX_PASSWORD_BYTES);
        let hash = h.hash(&max).await.unwrap();
        assert!(h.verify(&max, &hash).await.unwrap());
    }

    #[tokio::test]
    async fn dummy_hash_matches_the_configured_cost() {
        let h = hasher();
        let real = h.hash("secret123").await.unwrap();
        assert_eq!(&h.dummy_hash[..7], &real[..7]);
        h.verify_dummy("secret123").await.unwrap();
        assert!(!h.verify("secret123", &h.dummy_hash).await.unwrap());
    }

    #[test]
    fn production_hasher_uses_fixed_cost() {
        let h = PasswordHasher::new().unwrap();
        assert_eq!(h.cost, BCRYPT_COST);
        assert!(h.dummy_hash.starts_with("$2b$12$"));
    }
}
