//! JWT token issuance and verification

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::user::{Role, UserRecord};
use crate::domain::DomainError;

/// Identity carried inside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&UserRecord> for IdentityClaims {
    fn from(user: &UserRecord) -> Self {
        Self {
            sub: user.id().as_str().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            role: user.role().clone(),
        }
    }
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub identity: IdentityClaims,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    /// Get user ID from claims
    pub fn user_id(&self) -> &str {
        &self.identity.sub
    }

    pub fn role(&self) -> &Role {
        &self.identity.role
    }
}

/// How long issued tokens stay valid
///
/// Parsed from `<n>s`, `<n>m`, `<n>h`, `<n>d` or a bare number of seconds. The
/// unparsed text is what login responses report as `expires_in`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLifetime {
    raw: String,
    seconds: i64,
}

impl TokenLifetime {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }
}

impl Default for TokenLifetime {
    fn default() -> Self {
        Self {
            raw: "1h".to_string(),
            seconds: 3600,
        }
    }
}

impl FromStr for TokenLifetime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || DomainError::configuration(format!("Invalid token lifetime: '{}'", s));

        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        let (amount, unit) = raw.split_at(split);

        let amount: i64 = amount.parse().map_err(|_| invalid())?;
        let multiplier = match unit {
            "" | "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            _ => return Err(invalid()),
        };

        if amount == 0 {
            return Err(invalid());
        }

        let seconds = amount.checked_mul(multiplier).ok_or_else(invalid)?;

        Ok(Self {
            raw: raw.to_string(),
            seconds,
        })
    }
}

impl std::fmt::Display for TokenLifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Why a presented token was rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("signature mismatch")]
    BadSignature,

    #[error("malformed token: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Configuration for JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    pub lifetime: TokenLifetime,
}

impl JwtConfig {
    /// Create new JWT configuration
    pub fn new(secret: impl Into<String>, lifetime: TokenLifetime) -> Self {
        Self {
            secret: secret.into(),
            lifetime,
        }
    }
}

/// Trait for token operations
///
/// Stateless: implementations hold only key material and may be shared across
/// tasks without locking.
pub trait TokenService: Send + Sync + Debug {
    /// Sign a token for this identity, stamped with issue and expiry times
    fn issue(&self, identity: &IdentityClaims) -> Result<String, DomainError>;

    /// Check signature and expiry and return the payload. Performs no I/O.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;

    /// Lifetime given to issued tokens
    fn lifetime(&self) -> &TokenLifetime;
}

/// HS256 JWT service using a shared secret
#[derive(Clone)]
pub struct JwtService {
    lifetime: TokenLifetime,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("lifetime", &self.lifetime)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            lifetime: config.lifetime,
            encoding_key,
            decoding_key,
            validation,
        }
    }
}

impl TokenService for JwtService {
    fn issue(&self, identity: &IdentityClaims) -> Result<String, DomainError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            identity: identity.clone(),
            iat: now,
            exp: now + self.lifetime.seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    fn lifetime(&self) -> &TokenLifetime {
        &self.lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> IdentityClaims {
        IdentityClaims {
            sub: "1".to_string(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            role: Role::User,
        }
    }

    fn create_service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig::new(secret, TokenLifetime::default()))
    }

    fn sign_raw(claims: &TokenClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_service("test-secret-key-12345");

        let token = service.issue(&identity()).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.identity, identity());
        assert_eq!(claims.user_id(), "1");
        assert_eq!(claims.role(), &Role::User);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_payload_uses_flat_claim_names() {
        let service = create_service("secret");
        let token = service.issue(&identity()).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let raw = decode::<serde_json::Value>(&token, &DecodingKey::from_secret(b""), &validation)
            .unwrap()
            .claims;

        assert_eq!(raw["sub"], "1");
        assert_eq!(raw["role"], "user");
        assert!(raw.get("identity").is_none());
    }

    #[test]
    fn test_expired_token() {
        let service = create_service("test-secret");
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            identity: identity(),
            iat: now - 7200,
            exp: now - 10,
        };

        let token = sign_raw(&claims, "test-secret");

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_flipped_signature_byte() {
        let service = create_service("test-secret");
        let token = service.issue(&identity()).unwrap();

        let (body, signature) = token.rsplit_once('.').unwrap();
        let mut signature: Vec<char> = signature.chars().collect();
        signature[0] = if signature[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", body, signature.into_iter().collect::<String>());

        assert!(service.verify(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = create_service("secret-1");
        let verifier = create_service("secret-2");

        let token = issuer.issue(&identity()).unwrap();

        assert_eq!(verifier.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_malformed_token() {
        let service = create_service("secret");

        assert!(matches!(service.verify("invalid-token"), Err(TokenError::Malformed(_))));
        assert!(matches!(service.verify(""), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_payload_missing_identity_is_malformed() {
        let service = create_service("secret");
        let exp = Utc::now().timestamp() + 600;
        let token = encode(
            &Header::default(),
            &serde_json::json!({ "sub": "1", "exp": exp }),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(service.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_lifetime_parsing() {
        let parse = |s: &str| s.parse::<TokenLifetime>();

        assert_eq!(parse("1h").unwrap().seconds(), 3600);
        assert_eq!(parse("30m").unwrap().seconds(), 1800);
        assert_eq!(parse("45s").unwrap().seconds(), 45);
        assert_eq!(parse("7d").unwrap().seconds(), 604_800);
        assert_eq!(parse("900").unwrap().seconds(), 900);
        assert_eq!(parse(" 2h ").unwrap().as_str(), "2h");

        for invalid in ["", "h", "0", "1w", "1.5h", "-1h", "99999999999999999999d"] {
            assert!(parse(invalid).is_err(), "expected '{}' to be rejected", invalid);
        }
    }

    #[test]
    fn test_custom_lifetime_applied() {
        let service = JwtService::new(JwtConfig::new("secret", "15m".parse().unwrap()));
        let claims = service.verify(&service.issue(&identity()).unwrap()).unwrap();

        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(service.lifetime().as_str(), "15m");
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", create_service("super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
