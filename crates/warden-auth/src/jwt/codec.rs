//! HS256 token codec with issuer, audience and skew-aware expiry checks.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Map, Value};

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::traits::Clock;

use super::claims::{Claims, RESERVED_CLAIMS, VerifiedToken};
use super::error::TokenError;

/// Minimum signing key length in bytes (256 bits).
pub const MIN_KEY_BYTES: usize = 32;

/// A freshly signed token and its validity window.
#[derive(Clone)]
pub struct IssuedToken {
    /// Compact JWS string.
    pub token: String,
    /// Issued-at instant, truncated to whole seconds.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant, truncated to whole seconds.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Creates and verifies signed, time-bounded bearer tokens.
///
/// Expiry and issued-at are checked against the injected [`Clock`] rather
/// than by the JWT library, so the skew allowance applies symmetrically
/// and tests can move time explicitly.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: Option<String>,
    clock_skew: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("clock_skew", &self.clock_skew)
            .finish_non_exhaustive()
    }
}

impl JwtCodec {
    /// Builds a codec from configuration.
    ///
    /// Fails with a configuration error when the secret is absent or shorter
    /// than 256 bits, the issuer is blank, or the skew is out of range.
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let key = signing_key_bytes(&config.jwt_secret)?;

        let issuer = config.jwt_issuer.trim().to_string();
        if issuer.is_empty() {
            return Err(AppError::configuration("auth.jwt_issuer must not be blank"));
        }
        let audience = config.audience().map(str::to_string);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[issuer.as_str()]);
        match &audience {
            Some(aud) => {
                validation.set_audience(&[aud.as_str()]);
                validation.set_required_spec_claims(&["sub", "iss", "iat", "exp", "aud"]);
            }
            None => {
                validation.validate_aud = false;
                validation.set_required_spec_claims(&["sub", "iss", "iat", "exp"]);
            }
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key),
            decoding_key: DecodingKey::from_secret(&key),
            validation,
            issuer,
            audience,
            clock_skew: config.clock_skew()?,
            clock,
        })
    }

    /// Signs a token for `subject` valid for `ttl`, carrying `claims`.
    pub fn issue(
        &self,
        subject: &str,
        ttl: Duration,
        claims: Map<String, Value>,
    ) -> Result<IssuedToken, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::Invalid("subject must not be blank".into()));
        }
        if let Some(name) = claims.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(TokenError::ReservedClaim(name.clone()));
        }

        let now = self.clock.now();
        let iat = now.timestamp();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Invalid(format!("ttl {ttl} out of range")))?
            .timestamp();

        let payload = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            iat,
            exp,
            aud: self.audience.clone(),
            custom: claims,
        };

        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: from_timestamp(iat)?,
            expires_at: from_timestamp(exp)?,
        })
    }

    /// Verifies signature, issuer, audience and validity window.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| map_decode_error(&e))?;
        let claims = data.claims;

        let now = self.clock.now().timestamp();
        let skew = self.clock_skew.num_seconds();

        if now > claims.exp.saturating_add(skew) {
            return Err(TokenError::Expired);
        }
        if claims.iat > now.saturating_add(skew) {
            return Err(TokenError::Invalid("issued in the future".into()));
        }

        Ok(VerifiedToken {
            issued_at: from_timestamp(claims.iat)?,
            expires_at: from_timestamp(claims.exp)?,
            subject: claims.sub,
            claims: claims.custom,
        })
    }
}

/// Resolve the configured secret into key bytes.
///
/// A value that decodes as standard base64 to at least 32 bytes is used
/// decoded; otherwise the raw UTF-8 bytes must be at least 32 long.
fn signing_key_bytes(secret: &str) -> Result<Vec<u8>, AppError> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(AppError::configuration("auth.jwt_secret is not set"));
    }

    if let Ok(decoded) = STANDARD.decode(secret) {
        if decoded.len() >= MIN_KEY_BYTES {
            return Ok(decoded);
        }
    }

    if secret.len() >= MIN_KEY_BYTES {
        return Ok(secret.as_bytes().to_vec());
    }

    Err(AppError::configuration(format!(
        "auth.jwt_secret must provide at least {} bits of key material",
        MIN_KEY_BYTES * 8
    )))
}

fn map_decode_error(err: &jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        JwtErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
        JwtErrorKind::InvalidAudience => TokenError::AudienceMismatch,
        JwtErrorKind::MissingRequiredClaim(claim) if claim == "iss" => TokenError::IssuerMismatch,
        JwtErrorKind::MissingRequiredClaim(claim) if claim == "aud" => {
            TokenError::AudienceMismatch
        }
        _ => TokenError::Invalid(err.to_string()),
    }
}

fn from_timestamp(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TokenError::Invalid(format!("timestamp {secs} out of range")))
}
