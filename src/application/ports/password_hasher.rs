/// One-way password hashing. Implementations may be CPU heavy; callers run
/// them off the async executor.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(pub String);
