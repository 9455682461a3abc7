//! bcrypt password hashing.
//!
//! Hashing is CPU-bound, so both operations run on tokio's blocking pool.

use thiserror::Error;

/// Cost factor for new hashes. Matches the `$2b$10$` hashes already stored.
pub const BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub async fn hash_password(plain: String) -> Result<String, PasswordError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, BCRYPT_COST)).await??;
    Ok(hashed)
}

/// Returns `false` for a mismatch and for a stored value that is not a bcrypt hash.
pub async fn verify_password(plain: String, hash: String) -> Result<bool, PasswordError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false)).await?;
    Ok(matches)
}
