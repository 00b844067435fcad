//! Login, request authentication, logout and registration.

use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, json};
use tracing::{debug, info, warn};

use warden_core::config::AuthConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::Clock;
use warden_core::types::NormalizedEmail;
use warden_database::PrincipalRepository;
use warden_entity::{NewPrincipal, Principal};

use crate::jwt::JwtCodec;
use crate::password::{PasswordHasher, PasswordPolicy};

use super::cookie::SessionCookies;

/// Plaintext verified against when no principal matches, so both login
/// failure paths cost one Argon2 verification.
const TIMING_DECOY: &str = "warden-timing-decoy";

/// Message returned for every credential failure.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Result of a successful login.
#[derive(Clone)]
pub struct LoginResult {
    /// The authenticated principal.
    pub principal: Principal,
    /// Signed bearer token.
    pub access_token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for LoginResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResult")
            .field("principal", &self.principal)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Per-request authentication state.
#[derive(Debug, Clone)]
pub enum Authentication {
    /// No usable bearer token.
    Anonymous,
    /// A valid token resolved to a stored principal.
    Authenticated(Principal),
}

impl Authentication {
    /// Whether a principal was resolved.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The resolved principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(p) => Some(p),
            Self::Anonymous => None,
        }
    }
}

/// Input for [`SessionManager::register`].
#[derive(Clone)]
pub struct RegisterRequest {
    /// Raw email as entered.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Stateless session service.
///
/// Sessions are self-contained signed tokens. Nothing is stored server
/// side, so logout only clears the client cookie and a token stays valid
/// until it expires.
#[derive(Clone)]
pub struct SessionManager {
    principals: Arc<dyn PrincipalRepository>,
    codec: Arc<JwtCodec>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    cookies: SessionCookies,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
    decoy_hash: String,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .field("policy", &self.policy)
            .field("cookies", &self.cookies)
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a session manager. Hashes the timing decoy once up front.
    pub fn new(
        principals: Arc<dyn PrincipalRepository>,
        codec: Arc<JwtCodec>,
        hasher: PasswordHasher,
        policy: PasswordPolicy,
        cookies: SessionCookies,
        clock: Arc<dyn Clock>,
        auth_config: &AuthConfig,
    ) -> Result<Self, AppError> {
        let access_ttl = auth_config.access_ttl()?;
        let decoy_hash = hasher.hash_password(TIMING_DECOY)?;

        Ok(Self {
            principals,
            codec,
            hasher,
            policy,
            cookies,
            clock,
            access_ttl,
            decoy_hash,
        })
    }

    /// Checks credentials and issues a bearer token.
    ///
    /// Unknown email and wrong password both yield the same `Unauthorized`.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let email = NormalizedEmail::new(email);
        let principal = if email.is_blank() {
            None
        } else {
            self.principals.find_by_email(&email).await?
        };

        let stored_hash = principal
            .as_ref()
            .map(|p| p.password_hash.clone())
            .unwrap_or_else(|| self.decoy_hash.clone());

        let matched = self
            .hasher
            .verify_password_blocking(password.to_string(), stored_hash)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Password verification failed");
                false
            });

        let principal = match principal {
            Some(p) if matched => p,
            Some(p) => {
                debug!(principal_id = %p.id, "Login rejected: password mismatch");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
            None => {
                debug!(email = %email, "Login rejected: unknown email");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        let mut claims = Map::new();
        claims.insert("roles".to_string(), json!(principal.roles));

        let issued = self
            .codec
            .issue(&principal.email, self.access_ttl, claims)
            .map_err(AppError::from)?;

        info!(principal_id = %principal.id, "Login succeeded");

        Ok(LoginResult {
            principal,
            access_token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    /// Resolves a request's bearer token to a principal.
    ///
    /// Never fails: any verification or lookup problem resolves to
    /// [`Authentication::Anonymous`].
    pub async fn authenticate(&self, token: Option<&str>) -> Authentication {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Authentication::Anonymous;
        };

        let verified = match self.codec.verify(token) {
            Ok(v) => v,
            Err(e) => {
                debug!(reason = e.reason(), "Bearer token rejected");
                return Authentication::Anonymous;
            }
        };

        let email = NormalizedEmail::new(&verified.subject);
        match self.principals.find_by_email(&email).await {
            Ok(Some(principal)) => Authentication::Authenticated(principal),
            Ok(None) => {
                debug!("Bearer token subject no longer exists");
                Authentication::Anonymous
            }
            Err(e) => {
                warn!(error = %e, "Principal lookup failed during authentication");
                Authentication::Anonymous
            }
        }
    }

    /// Reads the session cookie from a raw `Cookie` header and authenticates.
    pub async fn authenticate_cookie_header(&self, header: Option<&str>) -> Authentication {
        let token = header.and_then(|h| self.cookies.token_from_header(h));
        self.authenticate(token.as_deref()).await
    }

    /// Cookie to set after a successful login.
    pub fn login_cookie(&self, result: &LoginResult) -> Cookie<'static> {
        self.cookies
            .session(&result.access_token, self.access_ttl.num_seconds())
    }

    /// Client-side logout: a cookie that clears the session.
    pub fn logout(&self) -> Cookie<'static> {
        self.cookies.removal()
    }

    /// Creates a principal with the base role.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<Principal> {
        let email = NormalizedEmail::new(&request.email);
        if email.is_blank() {
            return Err(AppError::validation("Email is required"));
        }

        if let Err(violations) = self.policy.validate(&request.password) {
            let message = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::validation(message));
        }

        if self.principals.exists_by_email(&email).await? {
            return Err(AppError::conflict("Email already in use"));
        }

        let password_hash = self.hasher.hash_password_blocking(request.password).await?;

        let mut data = NewPrincipal::new(email, password_hash);
        data.first_name = request.first_name.filter(|n| !n.trim().is_empty());
        data.last_name = request.last_name.filter(|n| !n.trim().is_empty());

        let principal = self.principals.create(data, self.clock.now()).await?;
        info!(principal_id = %principal.id, "Principal registered");
        Ok(principal)
    }

    /// Roles carried by a verified token, without a store lookup.
    pub fn token_roles(&self, token: &str) -> Option<Vec<String>> {
        self.codec
            .verify(token)
            .ok()
            .map(|v| v.string_list("roles"))
    }
}
