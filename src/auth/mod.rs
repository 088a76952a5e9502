use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT payload. Issued by the identity provider; `token` on the CLI mints the same shape for development.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Authenticated user id. Service tokens may carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<u64>,
    /// Branch restriction for scoped roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filiale_id: Option<u64>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: Option<u64>, filiale_id: Option<u64>, permissions: Vec<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            filiale_id,
            permissions,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

/// HMAC secret shared by token issuance and verification
#[derive(Clone)]
pub struct JwtKeys {
    secret: String,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn generate(&self, claims: &Claims) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrips_claims() {
        let keys = JwtKeys::new("secret");
        let claims = Claims::new(Some(42), Some(7), vec!["filiales.view".into()], 1);

        let token = keys.generate(&claims).unwrap();
        assert_eq!(keys.validate(&token).unwrap(), claims);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtKeys::new("one").generate(&Claims::new(Some(1), None, vec![], 1)).unwrap();
        assert!(matches!(JwtKeys::new("two").validate(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let result = JwtKeys::new("").generate(&Claims::new(Some(1), None, vec![], 1));
        assert!(matches!(result, Err(JwtError::InvalidSecret)));
    }
}
