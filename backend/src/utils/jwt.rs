use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sweetshop_shared::{UserRole, JWT_ACCESS_TOKEN_EXPIRY, JWT_PARTNER_TOKEN_EXPIRY};
use uuid::Uuid;

use crate::error::AppError;


pub const ACCESS_TOKEN: &str = "access";
pub const PARTNER_TOKEN: &str = "partner";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user or partner ID)
    pub name: String,       // Display name
    pub role: UserRole,     // Caller role
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID
    pub token_type: String, // "access" or "partner"
}

impl Claims {
    pub fn subject_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Authentication("Invalid subject in token".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        if secret.len() < 32 {
            return Err(AppError::Internal(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub", "iat", "jti"]);
        validation.validate_nbf = false;
        validation.leeway = 30;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Token for a shopper or admin account.
    ///
    /// Accounts are managed elsewhere; this exists so every issuer shares one claim format.
    pub fn issue_user_token(
        &self,
        user_id: Uuid,
        name: String,
        role: UserRole,
    ) -> Result<String, AppError> {
        if role == UserRole::Partner {
            return Err(AppError::Internal(
                "Partner sessions are issued through partner login".to_string(),
            ));
        }
        self.issue(user_id, name, role, ACCESS_TOKEN, JWT_ACCESS_TOKEN_EXPIRY)
    }

    pub fn issue_partner_token(&self, partner_id: Uuid, name: String) -> Result<String, AppError> {
        self.issue(
            partner_id,
            name,
            UserRole::Partner,
            PARTNER_TOKEN,
            JWT_PARTNER_TOKEN_EXPIRY,
        )
    }

    fn issue(
        &self,
        subject: Uuid,
        name: String,
        role: UserRole,
        token_type: &str,
        lifetime: std::time::Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now
            + Duration::from_std(lifetime)
                .map_err(|_| AppError::Internal("Invalid token expiry duration".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            name,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Authentication("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Authentication("Invalid token signature".to_string())
                }
                _ => AppError::Authentication("Invalid token".to_string()),
            })?;

        let claims = token_data.claims;
        let role_matches_type = match claims.token_type.as_str() {
            ACCESS_TOKEN => claims.role != UserRole::Partner,
            PARTNER_TOKEN => claims.role == UserRole::Partner,
            _ => false,
        };
        if !role_matches_type {
            return Err(AppError::Authentication("Invalid token type".to_string()));
        }

        Ok(claims)
    }
}
