//! Bearer-token verification only. JWT *minting* and the OAuth dance that
//! produces a token in the first place are external collaborators
//! (SPEC_FULL.md §1 Out of scope) — this crate only has to check a token
//! the caller already holds, which is why [`JwtVerifier`] has no `sign`.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Claims carried by the tokens this pipeline accepts. `sub` is the stable
/// subject string the registry keys its `User` rows on (SPEC_FULL.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
pub struct JwtVerifier {
    secret: String,
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl JwtVerifier {
    /// `secret` is `JWT_PRIVATE` from the environment (§6/§10.3), used as an
    /// HMAC key — the original source's only supported scheme.
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(data.claims)
    }
}

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
pub struct JwtVerifier;

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
impl JwtVerifier {
    pub fn new(_secret: impl Into<String>) -> Self {
        Self
    }

    pub fn verify(&self, _token: &str) -> AuthResult<Claims> {
        Err(AuthError::InvalidToken(
            "JWT support is disabled (enable jwt-aws-lc-rs or jwt-rust-crypto)".to_string(),
        ))
    }
}

#[cfg(all(test, any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    fn token_for(sub: &str, exp: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp,
            iat: Some(0),
            extra: serde_json::Map::new(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verifies_a_well_formed_token() {
        let secret = "test-secret";
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_for("user-1", exp, secret);

        let verifier = JwtVerifier::new(secret);
        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn rejects_expired_token() {
        let secret = "test-secret";
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = token_for("user-1", exp, secret);

        let verifier = JwtVerifier::new(secret);
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_for("user-1", exp, "secret-a");

        let verifier = JwtVerifier::new("secret-b");
        assert!(verifier.verify(&token).is_err());
    }
}
