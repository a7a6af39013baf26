use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use hireflow_config::JwtSettings;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token carries no tenant claim")]
    MissingTenant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub name: String,
    pub email: String,
    /// Tenant (company) the token is scoped to. Tokens without one are
    /// rejected before any repository call.
    pub tenant_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

pub struct AuthService {
    jwt_settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_settings: JwtSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(jwt_settings.secret.as_bytes());
        Self {
            jwt_settings,
            encoding_key,
            decoding_key,
        }
    }

    /// Mint a tenant-scoped access token. The production identity provider
    /// is an external collaborator; this is used by tests and tooling.
    pub fn generate_token(
        &self,
        user_id: ObjectId,
        name: &str,
        email: &str,
        tenant_id: Option<ObjectId>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id.to_hex(),
            name: name.to_string(),
            email: email.to_string(),
            tenant_id: tenant_id.map(|t| t.to_hex()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.jwt_settings.access_token_ttl_secs as i64))
                .timestamp(),
            iss: self.jwt_settings.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.jwt_settings.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// The sole authorization primitive: derive the tenant partition from
    /// verified claims, rejecting tokens that carry none.
    pub fn resolve_tenant(&self, claims: &Claims) -> Result<ObjectId, AuthError> {
        let raw = claims.tenant_id.as_deref().ok_or(AuthError::MissingTenant)?;
        ObjectId::parse_str(raw)
            .map_err(|_| AuthError::InvalidToken("Malformed tenant claim".to_string()))
    }
}
