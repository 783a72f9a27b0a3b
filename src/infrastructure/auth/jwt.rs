//! Bearer token issuance and verification (HS256)

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt::Debug;
use tracing::warn;

use crate::domain::auth::{AuthError, IssuedToken, TokenClaims};
use crate::domain::user::User;
use crate::domain::DomainError;

/// Keys shorter than this still work but are flagged at start-up
const RECOMMENDED_KEY_BYTES: usize = 32;

/// Longest accepted token lifetime: one leap year
pub const MAX_EXPIRY_MINUTES: u64 = 366 * 24 * 60;

/// Token settings resolved from configuration
#[derive(Clone)]
pub struct TokenConfig {
    /// Shared HMAC secret
    pub key: String,
    pub issuer: String,
    pub audience: String,
    /// Lifetime of issued tokens
    pub expiry_minutes: u64,
    /// Clock skew tolerated when checking expiry
    pub leeway_seconds: u64,
}

impl Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("key", &"[hidden]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry_minutes", &self.expiry_minutes)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(
        key: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiry_minutes: u64,
    ) -> Self {
        Self {
            key: key.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            expiry_minutes,
            leeway_seconds: 0,
        }
    }

    pub fn with_leeway_seconds(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    /// Reject a configuration that cannot sign or check tokens
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("jwt.key", &self.key),
            ("jwt.issuer", &self.issuer),
            ("jwt.audience", &self.audience),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::configuration(format!(
                    "{} must be set and non-empty",
                    name
                )));
            }
        }

        if self.expiry_minutes > MAX_EXPIRY_MINUTES {
            return Err(DomainError::configuration(format!(
                "jwt.expiry_in_minutes must be at most {} (got {})",
                MAX_EXPIRY_MINUTES, self.expiry_minutes
            )));
        }

        if self.key.len() < RECOMMENDED_KEY_BYTES {
            warn!(
                key_bytes = self.key.len(),
                "jwt.key is shorter than {} bytes; use a longer secret in production",
                RECOMMENDED_KEY_BYTES
            );
        }

        Ok(())
    }
}

/// Issue and verify bearer tokens
pub trait TokenGenerator: Send + Sync + Debug {
    /// Sign a token for a user
    fn issue(&self, user: &User) -> Result<IssuedToken, AuthError>;

    /// Check signature, issuer, audience and expiry, returning the claims
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// HS256 token service
#[derive(Clone)]
pub struct JwtService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a token service, failing on an unusable configuration
    pub fn new(config: TokenConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.key.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims::for_user(
            user,
            &self.config.issuer,
            &self.config.audience,
            now,
            self.config.expiry_minutes,
        )
        .ok_or_else(|| DomainError::configuration("jwt.expiry_in_minutes is out of range"))?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // Expiry is checked below so that a zero-minute token is already expired
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(map_jwt_error)?
            .claims;

        if claims.is_expired_at(now, self.config.leeway_seconds) {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

impl TokenGenerator for JwtService {
    fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        self.issue_at(user, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }
}

fn map_jwt_error(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::invalid_token("signature mismatch"),
        ErrorKind::InvalidIssuer => AuthError::invalid_token("issuer mismatch"),
        ErrorKind::InvalidAudience => AuthError::invalid_token("audience mismatch"),
        ErrorKind::InvalidAlgorithm => AuthError::invalid_token("unexpected algorithm"),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::invalid_token(format!("missing claim '{}'", claim))
        }
        _ => AuthError::invalid_token(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{NewUser, UserId};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    fn create_test_user() -> User {
        let new_user = NewUser {
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
        };
        User::from_new(UserId::new(1), new_user, Utc::now())
    }

    fn create_service(expiry_minutes: u64) -> JwtService {
        JwtService::new(TokenConfig::new(SECRET, "catalog-api", "catalog-clients", expiry_minutes))
            .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_service(60);
        let issued = service.issue(&create_test_user()).unwrap();
        assert!(!issued.token.is_empty());

        let claims = service.verify(&issued.token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn test_zero_expiry_is_rejected_as_expired() {
        let service = create_service(0);
        let issued = service.issue(&create_test_user()).unwrap();

        assert!(matches!(
            service.verify(&issued.token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_leeway_allows_recently_expired() {
        let config = TokenConfig::new(SECRET, "catalog-api", "catalog-clients", 1)
            .with_leeway_seconds(120);
        let service = JwtService::new(config).unwrap();
        let issued_at = Utc::now() - chrono::Duration::seconds(90);
        let issued = service.issue_at(&create_test_user(), issued_at).unwrap();

        assert!(service.verify(&issued.token).is_ok());
        assert!(matches!(
            service.verify_at(&issued.token, Utc::now() + chrono::Duration::minutes(5)),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_key() {
        let other = JwtService::new(TokenConfig::new(
            "another-secret-key-that-is-long-enough",
            "catalog-api",
            "catalog-clients",
            60,
        ))
        .unwrap();
        let issued = other.issue(&create_test_user()).unwrap();

        let result = create_service(60).verify(&issued.token);
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_wrong_issuer() {
        let other =
            JwtService::new(TokenConfig::new(SECRET, "someone-else", "catalog-clients", 60))
                .unwrap();
        let issued = other.issue(&create_test_user()).unwrap();

        match create_service(60).verify(&issued.token) {
            Err(AuthError::InvalidToken { reason }) => assert_eq!(reason, "issuer mismatch"),
            other => panic!("expected invalid token, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_audience() {
        let other =
            JwtService::new(TokenConfig::new(SECRET, "catalog-api", "other-clients", 60)).unwrap();
        let issued = other.issue(&create_test_user()).unwrap();

        match create_service(60).verify(&issued.token) {
            Err(AuthError::InvalidToken { reason }) => assert_eq!(reason, "audience mismatch"),
            other => panic!("expected invalid token, got {:?}", other),
        }
    }

    #[test]
    fn test_tampered_payload() {
        let service = create_service(60);
        let issued = service.issue(&create_test_user()).unwrap();

        let mut claims = issued.claims.clone();
        claims.role = "admin".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(
            service.verify(&forged),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let service = create_service(60);
        let claims = TokenClaims::for_user(
            &create_test_user(),
            "catalog-api",
            "catalog-clients",
            Utc::now(),
            60,
        )
        .unwrap();
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_garbage_token() {
        let result = create_service(60).verify("not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_config_requires_key_issuer_audience() {
        assert!(JwtService::new(TokenConfig::new("", "i", "a", 5)).is_err());
        assert!(JwtService::new(TokenConfig::new(SECRET, " ", "a", 5)).is_err());
        assert!(JwtService::new(TokenConfig::new(SECRET, "i", "", 5)).is_err());
        assert!(JwtService::new(TokenConfig::new("short", "i", "a", 5)).is_ok());
    }

    #[test]
    fn test_config_rejects_out_of_range_expiry() {
        for expiry in [MAX_EXPIRY_MINUTES + 1, 1u64 << 58, u64::MAX] {
            let result = JwtService::new(TokenConfig::new(SECRET, "i", "a", expiry));
            assert!(matches!(result, Err(DomainError::Configuration { .. })));
        }

        let service = create_service(MAX_EXPIRY_MINUTES);
        let issued = service.issue(&create_test_user()).unwrap();
        assert!(issued.claims.exp > issued.claims.iat);
        assert!(service.verify(&issued.token).is_ok());
    }

    #[test]
    fn test_issue_reports_unrepresentable_expiry() {
        // Mutated after construction to skip start-up validation
        let mut service = create_service(60);
        service.config.expiry_minutes = u64::MAX;

        let result = service.issue(&create_test_user());
        assert!(matches!(
            result,
            Err(AuthError::Domain(DomainError::Configuration { .. }))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", create_service(5));
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("[hidden]"));
    }
}
