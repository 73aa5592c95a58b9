//! Session auth: registration, login, logout, and the session extractor.
//!
//! Sessions are stateless HS256 JWTs carried in an HttpOnly cookie (or an
//! Authorization bearer header). Resolving a session never touches the
//! database; handlers that need the full user record look it up themselves.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::{LoginRequest, RegisterRequest, User, UserResponse};
use crate::AppState;

use super::error::{ApiError, ApiSuccess, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name, validate_password};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// JWT claims for a session token
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// Subject - the user id
    sub: String,
    /// Issued at time (Unix timestamp)
    iat: i64,
    /// Expiration time (Unix timestamp)
    exp: i64,
}

/// The authenticated identity resolved from a session token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Mint a signed session token for a user id
pub fn issue_token(config: &AuthConfig, user_id: &str) -> Result<String, ApiError> {
    let now = Utc::now();
    let exp = now + Duration::days(config.session_ttl_days);

    let claims = SessionClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign session token: {}", e);
        ApiError::internal("Failed to create session")
    })
}

/// Resolve the session token from a request into an identity.
///
/// Absent, malformed, and expired tokens all resolve to None; callers see
/// no difference between the three.
pub fn resolve_session(headers: &HeaderMap, config: &AuthConfig) -> Option<Identity> {
    let token = extract_token(headers)?;

    let data = decode::<SessionClaims>(
        &token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()?;

    Some(Identity {
        user_id: data.claims.sub,
    })
}

/// Pull the session token from the cookie or the Authorization header
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookie
}

/// Extractor for the authenticated identity. Rejects with the same tagged
/// error envelope the rest of the API uses.
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(&parts.headers, &state.config.auth)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

fn validate_register_request(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_email(&req.email) {
        errors.add("email", e);
    }
    if let Err(e) = validate_password(&req.password) {
        errors.add("password", e);
    }
    if let Err(e) = validate_name(&req.name) {
        errors.add("name", e);
    }

    errors.finish()
}

/// Create an account and open a session
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiSuccess<UserResponse>>), ApiError> {
    validate_register_request(&req)?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to create account")
    })?;

    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&req.name)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("An account with this email already exists")
        } else {
            tracing::error!("Failed to create user: {}", e);
            ApiError::database("Failed to create account")
        }
    })?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!("Registered user {}", user.email);

    let token = issue_token(&state.config.auth, &user.id)?;
    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        ApiSuccess::data(UserResponse::from(user)),
    ))
}

/// Verify credentials and open a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiSuccess<UserResponse>>), ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    // Unknown email, credential-less account, and wrong password are all
    // the same error
    let user = user.ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;
    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(&state.config.auth, &user.id)?;
    Ok((
        jar.add(session_cookie(token)),
        ApiSuccess::data(UserResponse::from(user)),
    ))
}

/// Close the session by clearing the cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiSuccess<()>>) {
    (jar.remove(removal_cookie()), ApiSuccess::empty())
}

/// Return the user behind the current session
pub async fn session(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<ApiSuccess<UserResponse>>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&identity.user_id)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::unauthorized("Session user no longer exists"))?;
    Ok(ApiSuccess::data(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            session_ttl_days: 7,
        }
    }

    fn headers_with_cookie(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{}={}", SESSION_COOKIE, token).parse().unwrap(),
        );
        headers
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not a phc string"));
    }

    #[test]
    fn test_token_roundtrip_via_cookie() {
        let config = test_config();
        let token = issue_token(&config, "user-1").unwrap();

        let identity = resolve_session(&headers_with_cookie(&token), &config).unwrap();
        assert_eq!(identity.user_id, "user-1");
    }

    #[test]
    fn test_token_accepted_via_bearer_header() {
        let config = test_config();
        let token = issue_token(&config, "user-1").unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        let identity = resolve_session(&headers, &config).unwrap();
        assert_eq!(identity.user_id, "user-1");
    }

    #[test]
    fn test_missing_and_garbage_tokens_resolve_to_none() {
        let config = test_config();

        assert!(resolve_session(&HeaderMap::new(), &config).is_none());
        assert!(resolve_session(&headers_with_cookie("garbage"), &config).is_none());
    }

    #[test]
    fn test_expired_token_resolves_to_none() {
        let config = test_config();
        let past = Utc::now() - Duration::hours(2);
        let claims = SessionClaims {
            sub: "user-1".to_string(),
            iat: past.timestamp(),
            exp: (past + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(resolve_session(&headers_with_cookie(&token), &config).is_none());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let config = test_config();
        let other = AuthConfig {
            jwt_secret: "other-secret".to_string(),
            session_ttl_days: 7,
        };
        let token = issue_token(&other, "user-1").unwrap();

        assert!(resolve_session(&headers_with_cookie(&token), &config).is_none());
    }
}
