/*!
 * # Authentication and Authorization Module
 *
 * Two static accounts (ADMIN and USER) are loaded from configuration into a
 * [`CredentialStore`] at startup. Callers authenticate with either:
 *
 * - HTTP Basic credentials on every request, or
 * - a bearer JWT obtained from `POST /token` with Basic credentials.
 *
 * Route groups are gated by role through [`AuthRouterExt::with_roles`].
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm as Argon2Algorithm, Argon2, Params, Version,
};
use axum::{
    extract::{Extension, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine as _;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::config::AppConfig;

/// Realm advertised in `WWW-Authenticate` challenges.
pub const AUTH_REALM: &str = "inventory";

/// Static access roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

#[derive(Debug, Clone)]
struct Account {
    password_hash: String,
    role: Role,
}

/// Immutable username to (argon2 hash, role) table.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    accounts: HashMap<String, Account>,
    params: Params,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Uses custom argon2 cost parameters for newly hashed passwords.
    pub fn with_params(params: Params) -> Self {
        Self {
            accounts: HashMap::new(),
            params,
        }
    }

    /// Argon2id with the given memory (KiB) and iteration cost on one lane.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| AuthError::InternalError(format!("Invalid argon2 parameters: {}", e)))?;
        Ok(Self::with_params(params))
    }

    /// Builds the ADMIN and USER accounts from configuration.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AuthError> {
        Self::new()
            .with_account(&cfg.admin_username, &cfg.admin_password, Role::Admin)?
            .with_account(&cfg.user_username, &cfg.user_password, Role::User)
    }

    pub fn with_account(
        mut self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Self, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hasher = Argon2::new(Argon2Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let password_hash = hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(format!("Failed to hash password: {}", e)))?
            .to_string();

        self.accounts.insert(
            username.to_string(),
            Account {
                password_hash,
                role,
            },
        );
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Returns the account role when the password matches.
    pub fn verify(&self, username: &str, password: &str) -> Result<Role, AuthError> {
        let account = self
            .accounts
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&account.password_hash)
            .map_err(|e| AuthError::InternalError(format!("Invalid password hash: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map(|_| account.role)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, jwt_issuer: String, access_token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Verifies credentials and issues and validates bearer tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
    credentials: CredentialStore,
}

impl AuthService {
    pub fn new(config: AuthConfig, credentials: CredentialStore) -> Self {
        Self {
            config,
            credentials,
        }
    }

    pub fn from_app_config(cfg: &AppConfig) -> Result<Self, AuthError> {
        Ok(Self::new(cfg.into(), CredentialStore::from_config(cfg)?))
    }

    /// Checks a username and password against the credential store.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<AuthUser, AuthError> {
        let role = self.credentials.verify(username, password)?;
        Ok(AuthUser {
            username: username.to_string(),
            role,
        })
    }

    /// Decodes the payload of an `Authorization: Basic ...` header.
    pub fn authenticate_basic(&self, encoded: &str) -> Result<AuthUser, AuthError> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::InvalidCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidCredentials)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::InvalidCredentials)?;

        self.authenticate(username, password)
    }

    /// Generate a JWT token for an authenticated caller
    pub fn issue_token(&self, user: &AuthUser) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            role: user.role,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Resolves the caller from an `Authorization` header value.
    pub fn authenticate_header(&self, value: &str) -> Result<AuthUser, AuthError> {
        if let Some(encoded) = strip_scheme(value, "Basic") {
            return self.authenticate_basic(encoded);
        }
        if let Some(token) = strip_scheme(value, "Bearer") {
            let claims = self.validate_token(token)?;
            return Ok(AuthUser {
                username: claims.sub,
                role: claims.role,
            });
        }
        Err(AuthError::MissingAuth)
    }
}

fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let (given, rest) = value.trim().split_once(' ')?;
    given.eq_ignore_ascii_case(scheme).then(|| rest.trim())
}

/// Bearer token issued by `POST /token`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub role: Role,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MissingAuth => "AUTH_MISSING",
            Self::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::InvalidToken => "AUTH_INVALID_TOKEN",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::TokenCreation(_) => "AUTH_TOKEN_CREATION_FAILED",
            Self::InsufficientPermissions => "AUTH_INSUFFICIENT_PERMISSIONS",
            Self::InternalError(_) => "AUTH_INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::MissingAuth => "Authentication required".to_string(),
            Self::TokenCreation(_) | Self::InternalError(_) => {
                warn!(error = %self, "authentication failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(challenge) =
                HeaderValue::from_str(&format!("Basic realm=\"{}\"", AUTH_REALM))
            {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, challenge);
            }
        }
        response
    }
}

/// Authentication middleware that resolves the caller from the `Authorization` header
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    // CORS pre-flight never carries credentials
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".into())
                .into_response();
        }
    };

    let user = match authorization_header(request.headers())
        .ok_or(AuthError::MissingAuth)
        .and_then(|value| auth_service.authenticate_header(value))
    {
        Ok(user) => user,
        Err(e) => {
            debug!(error = %e, "request rejected by authentication");
            return e.into_response();
        }
    };

    debug!(username = %user.username, role = %user.role, "request authenticated");
    request.extensions_mut().insert(user);
    next.run(request).await
}

fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Role middleware to check if the caller holds one of the allowed roles
pub async fn role_middleware(
    State(allowed): State<Arc<[Role]>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_any_role(&allowed) {
        warn!(username = %user.username, role = %user.role, "role not permitted for route");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Exchange Basic credentials for a bearer token
#[utoipa::path(
    post,
    path = "/token",
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Missing or invalid credentials")
    ),
    security(("basic_auth" = [])),
    tag = "auth"
)]
pub async fn issue_token_handler(
    Extension(auth_service): Extension<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AuthError> {
    let encoded = authorization_header(&headers)
        .and_then(|value| strip_scheme(value, "Basic"))
        .ok_or(AuthError::MissingAuth)?;

    let user = auth_service.authenticate_basic(encoded)?;
    let token = auth_service.issue_token(&user)?;
    debug!(username = %user.username, "bearer token issued");
    Ok(Json(token))
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_roles(self, roles: &[Role]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_roles(self, roles: &[Role]) -> Self {
        let allowed: Arc<[Role]> = Arc::from(roles);
        self.layer(axum::middleware::from_fn_with_state(
            allowed,
            role_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
pub(crate) fn test_credentials() -> CredentialStore {
    // Minimum argon2 cost keeps tests fast.
    CredentialStore::with_cost(8, 1)
        .unwrap()
        .with_account("admin", "admin", Role::Admin)
        .unwrap()
        .with_account("user", "user", Role::User)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        AuthService::new(
            AuthConfig::new(
                "unit-test-signing-key-with-plenty-of-entropy-0123456789abcdefXYZ".into(),
                "inventory-api".into(),
                Duration::from_secs(600),
            ),
            test_credentials(),
        )
    }

    fn basic(user: &str, pass: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", user, pass))
    }

    #[test]
    fn verifies_configured_accounts() {
        let store = test_credentials();
        assert_eq!(store.len(), 2);
        assert_eq!(store.verify("admin", "admin").unwrap(), Role::Admin);
        assert_eq!(store.verify("user", "user").unwrap(), Role::User);
        assert_matches!(store.verify("user", "admin"), Err(AuthError::InvalidCredentials));
        assert_matches!(store.verify("nobody", "x"), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn basic_header_resolves_role() {
        let svc = service();
        let user = svc
            .authenticate_header(&format!("Basic {}", basic("admin", "admin")))
            .unwrap();
        assert_eq!(user.role, Role::Admin);

        assert_matches!(
            svc.authenticate_header("Basic not-base64!"),
            Err(AuthError::InvalidCredentials)
        );
        assert_matches!(
            svc.authenticate_header("Digest abc"),
            Err(AuthError::MissingAuth)
        );
    }

    #[test]
    fn issued_token_round_trips() {
        let svc = service();
        let user = svc.authenticate("user", "user").unwrap();
        let token = svc.issue_token(&user).unwrap();
        assert_eq!(token.token_type, "Bearer");

        let resolved = svc
            .authenticate_header(&format!("Bearer {}", token.access_token))
            .unwrap();
        assert_eq!(resolved, user);
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let svc = service();
        let other = AuthService::new(
            AuthConfig::new(
                "a-completely-different-signing-key-0123456789-abcdefghijklmnopq".into(),
                "inventory-api".into(),
                Duration::from_secs(600),
            ),
            test_credentials(),
        );
        let user = other.authenticate("admin", "admin").unwrap();
        let token = other.issue_token(&user).unwrap();

        assert_matches!(
            svc.validate_token(&token.access_token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn unauthorized_responses_carry_basic_challenge() {
        let response = AuthError::MissingAuth.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"inventory\""
        );

        let response = AuthError::InsufficientPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
