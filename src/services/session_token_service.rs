use crate::models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    #[error("Malformed session token")]
    Malformed,
    #[error("Unsupported signing algorithm")]
    UnsupportedAlgorithm,
    #[error("Invalid session token signature")]
    InvalidSignature,
    #[error("Session token has expired")]
    Expired,
    #[error("Invalid signing key")]
    InvalidKey,
    #[error("Failed to sign session token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for SessionTokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => SessionTokenError::Expired,
            ErrorKind::InvalidSignature => SessionTokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                SessionTokenError::UnsupportedAlgorithm
            }
            ErrorKind::InvalidKeyFormat => SessionTokenError::InvalidKey,
            _ => SessionTokenError::Malformed,
        }
    }
}

/// Payload carried by a session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies stateless HS256 session credentials.
pub struct SessionTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for SessionTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionTokenService {
    pub fn new(key: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        let key = key.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &User) -> Result<String, SessionTokenError> {
        let iat = Utc::now().timestamp();
        self.encode(&SessionClaims {
            user_id: user.id,
            email: user.email.clone(),
            iat,
            exp: iat + self.ttl.num_seconds(),
        })
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, SessionTokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(SessionTokenError::Signing)
    }

    /// Verifies signature and expiry against the current time.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Like [`decode`](Self::decode), with expiry judged at `now`.
    ///
    /// A credential is valid strictly before `exp`; the library check alone
    /// would still accept `now == exp`.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<SessionClaims, SessionTokenError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?.claims;

        if now >= claims.exp {
            return Err(SessionTokenError::Expired);
        }

        Ok(claims)
    }
}
