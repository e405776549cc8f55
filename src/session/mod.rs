//! Bearer sessions.
//! `POST /api/auth` exchanges the configured administrator credentials for an
//! HS256 token. Privileged handlers take a [`Session`] or [`Admin`] extractor,
//! which verify the signature and check expiry against the server clock on
//! every request.
// region:    --- Imports
use crate::error::MarketError;
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use chrono::{DateTime, Utc};
use jwt_simple::prelude::{Claims, Duration as JwtDuration, HS256Key, MACLike};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

// endregion: --- Imports

// region:    --- Claims
/// Application claims carried next to the registered JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    pub admin: bool,
}

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub admin: bool,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Token handed back by a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// endregion: --- Claims

// region:    --- Session Keys
/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    key: HS256Key,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            key: HS256Key::from_bytes(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, subject: &str, admin: bool) -> Result<IssuedToken, MarketError> {
        let claims = Claims::with_custom_claims(
            SessionClaims { admin },
            JwtDuration::from_secs(self.ttl.as_secs()),
        )
        .with_subject(subject);

        let expires_at = claims
            .expires_at
            .and_then(|exp| DateTime::<Utc>::from_timestamp(exp.as_secs() as i64, 0))
            .ok_or_else(|| MarketError::Internal("token without expiry".to_string()))?;

        let token = self
            .key
            .authenticate(claims)
            .map_err(|e| MarketError::Internal(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify `token` and check it is still valid at `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        // The library applies a clock tolerance; expiry is decided below on `now`
        let claims = match self.key.verify_token::<SessionClaims>(token, None) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("{:<12} --> token rejected: {}", "Session", e);
                return None;
            }
        };

        let session = Session {
            subject: claims.subject?,
            admin: claims.custom.admin,
            expires_at: DateTime::<Utc>::from_timestamp(claims.expires_at?.as_secs() as i64, 0)?,
        };
        session.is_active(now).then_some(session)
    }
}

/// The single configured backoffice credential pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

// endregion: --- Session Keys

// region:    --- Extractors
#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(auth) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| MarketError::Unauthorized)?;

        SessionKeys::from_ref(state)
            .verify(auth.token(), Utc::now())
            .ok_or(MarketError::Unauthorized)
    }
}

/// A caller that may be anonymous. No `Authorization` header means `None`;
/// a header that does not verify is refused.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(Self(None));
        }
        Session::from_request_parts(parts, state)
            .await
            .map(|session| Self(Some(session)))
    }
}

/// A session holding the admin claim.
#[derive(Debug, Clone)]
pub struct Admin(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = MarketError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.admin {
            Ok(Self(session))
        } else {
            Err(MarketError::Forbidden)
        }
    }
}

// endregion: --- Extractors

// endregion: --- Tests
