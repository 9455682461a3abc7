use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Claims
///
/// The payload signed into every session token. Downstream handlers only ever see
/// these three identity fields; the role *description* is always re-read from the
/// database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i32,
    pub name: String,
    pub role_id: Option<i32>,
    /// Issued At (seconds since the epoch).
    pub iat: usize,
    /// Expiration Time (seconds since the epoch).
    pub exp: usize,
}

impl Claims {
    /// Claims for `user`, valid for `ttl` from now.
    pub fn for_user(user: &User, ttl: Duration) -> Self {
        let now = unix_now();
        Claims {
            id: user.id,
            name: user.name.clone(),
            role_id: user.role_id,
            iat: now as usize,
            exp: (now + ttl.as_secs()) as usize,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Signs `claims` with HS256.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry, returning the decoded claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
}
