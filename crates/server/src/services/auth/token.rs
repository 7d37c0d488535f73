//! Bearer token issuance and validation.
//!
//! HS256 JSON Web Tokens carrying the admin identity and role claim. The
//! secret comes from `TREASURY_TOKEN_SECRET`.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use treasury_core::AdminId;

use super::AuthError;
use crate::models::admin::{Admin, CurrentAdmin};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the admin ID.
    pub sub: String,
    /// Admin username, for display and logging.
    pub username: String,
    /// Role claim: whether the admin may manage other accounts.
    pub is_superuser: bool,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// Issues and validates bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_hours: u32,
}

impl TokenService {
    /// Create a token service with the given signing secret and lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_hours: u32) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl_hours,
        }
    }

    /// Issue an access token for an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if encoding fails.
    pub fn issue(&self, admin: &Admin) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username.to_string(),
            is_superuser: admin.is_superuser,
            iat: now,
            exp: now + i64::from(self.ttl_hours) * 3600,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Validate a token and return the admin identity it carries.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on any signature, format or expiry
    /// problem.
    pub fn verify(&self, token: &str) -> Result<CurrentAdmin, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::InvalidToken)?;

        let id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(CurrentAdmin {
            id: AdminId::new(id),
            username: data.claims.username,
            is_superuser: data.claims.is_superuser,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use treasury_core::Username;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("0123456789abcdef0123456789abcdef"), 24)
    }

    fn admin(is_superuser: bool) -> Admin {
        Admin {
            id: AdminId::new(7),
            username: Username::parse("jane").expect("valid username"),
            password_hash: "unused".to_owned(),
            is_superuser,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = service();
        let token = service.issue(&admin(true)).expect("issue");

        let current = service.verify(&token).expect("verify");
        assert_eq!(current.id, AdminId::new(7));
        assert_eq!(current.username, "jane");
        assert!(current.is_superuser);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = service();
        let mut token = service.issue(&admin(false)).expect("issue");
        token.push('x');

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(&admin(false)).expect("issue");
        let other = TokenService::new(&SecretString::from("ffffffffffffffffffffffffffffffff"), 24);

        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }
}
