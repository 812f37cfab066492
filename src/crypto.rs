use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::HashCost;
use crate::error::{AppError, AppResult};

const SALT_SIZE: usize = 16;

#[derive(Debug, Clone)]
pub struct Passwords {
    params: Params,
}

impl Passwords {
    pub fn new(cost: HashCost) -> AppResult<Self> {
        let params = Params::new(cost.memory_kib, cost.rounds, 1, None)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        Ok(Self { params })
    }

    fn salt() -> AppResult<SaltString> {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Ok(SaltString::encode_b64(&bytes)?)
    }

    // PHC string: algorithm, cost parameters, salt and digest.
    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = Self::salt()?;
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        Ok(hasher.hash_password(password.as_bytes(), &salt)?.to_string())
    }

    // Parameters come from the stored hash, so older cost settings still verify.
    pub fn verify(&self, candidate: &str, stored: &str) -> bool {
        PasswordHash::new(stored)
            .map(|hash| {
                Argon2::default()
                    .verify_password(candidate.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

// Bearer token payload. `sid` names the server-side session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, session: Uuid, ttl: Duration) -> AppResult<Self> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or_else(|| AppError::Internal(format!("token ttl out of range: {:?}", ttl)))?;
        Ok(Self {
            sub: user_id.to_string(),
            sid: session.to_string(),
            iat: now,
            exp,
        })
    }

    pub fn user_id(&self) -> AppResult<i32> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("invalid token subject".to_string()))
    }

    pub fn session_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sid)
            .map_err(|_| AppError::Unauthorized("invalid token session".to_string()))
    }
}

#[derive(Clone)]
pub struct Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Tokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn encode(&self, claims: &Claims) -> AppResult<String> {
        Ok(jsonwebtoken::encode(&Header::default(), claims, &self.encoding)?)
    }

    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passwords() -> Passwords {
        Passwords::new(HashCost { rounds: 1, memory_kib: 1024 }).unwrap()
    }

    #[test]
    fn hash_verifies_only_the_original() {
        let passwords = passwords();
        let hash = passwords.hash("secret123").unwrap();
        assert_ne!(hash, "secret123");
        assert!(passwords.verify("secret123", &hash));
        assert!(!passwords.verify("secret124", &hash));
        assert!(!passwords.verify("", &hash));
    }

    #[test]
    fn hash_is_salted_and_carries_cost() {
        let passwords = passwords();
        let a = passwords.hash("secret123").unwrap();
        let b = passwords.hash("secret123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(a.contains("t=1"));
    }

    #[test]
    fn verify_accepts_hashes_from_other_costs() {
        let stronger = Passwords::new(HashCost { rounds: 2, memory_kib: 2048 }).unwrap();
        let hash = stronger.hash("secret123").unwrap();
        assert!(passwords().verify("secret123", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!passwords().verify("secret123", "plaintext"));
    }

    #[test]
    fn zero_memory_cost_is_rejected() {
        assert!(Passwords::new(HashCost { rounds: 1, memory_kib: 0 }).is_err());
    }

    #[test]
    fn token_round_trip() {
        let tokens = Tokens::new(b"test-secret");
        let session = Uuid::new_v4();
        let token = tokens
            .encode(&Claims::new(7, session, Duration::from_secs(60)).unwrap())
            .unwrap();
        let claims = tokens.decode(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.session_id().unwrap(), session);
    }

    #[test]
    fn claims_reject_unrepresentable_ttl() {
        let err = Claims::new(1, Uuid::new_v4(), Duration::from_secs(u64::MAX)).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        let claims = Claims::new(1, Uuid::new_v4(), Duration::from_secs(60)).unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = Tokens::new(b"one")
            .encode(&Claims::new(1, Uuid::new_v4(), Duration::from_secs(60)).unwrap())
            .unwrap();
        let err = Tokens::new(b"two").decode(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
