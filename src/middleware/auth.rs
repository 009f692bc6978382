use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use base64::{Engine, engine::general_purpose::STANDARD};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{AuthenticatedUser, CartOwner},
    services::auth_service::{TokenKeys, authenticate},
    state::AppState,
};

/// Session key holding the id anonymous carts are stored under.
pub const CART_SESSION_KEY: &str = "cart_session_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

/// Who is calling: a user with a valid bearer token, otherwise the
/// anonymous session if it already carries a cart id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user: Option<AuthUser>,
    pub session_id: Option<String>,
}

impl Identity {
    pub fn user(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            session_id: None,
        }
    }

    pub fn anonymous(session_id: impl Into<String>) -> Self {
        Self {
            user: None,
            session_id: Some(session_id.into()),
        }
    }

    /// Gives an anonymous caller without a cart session a fresh one. Only
    /// opening a cart writes to the session store.
    pub async fn with_session(self, session: &Session) -> Result<Self, AppError> {
        if self.user.is_some() || self.session_id.is_some() {
            return Ok(self);
        }
        let id = Uuid::new_v4().to_string();
        session
            .insert(CART_SESSION_KEY, &id)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        tracing::debug!(session_id = %id, "new anonymous cart session");
        Ok(Identity::anonymous(id))
    }

    /// The owner a cart is looked up by. An authenticated user always wins
    /// over the session.
    pub fn owner(&self) -> Option<CartOwner> {
        match (&self.user, &self.session_id) {
            (Some(user), _) => Some(CartOwner::User(user.user_id)),
            (None, Some(session_id)) => Some(CartOwner::Session(session_id.clone())),
            (None, None) => None,
        }
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = bearer_user(parts, &state.tokens)? {
            return Ok(Identity::user(user));
        }

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;
        let session_id = session
            .get::<String>(CART_SESSION_KEY)
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Identity {
            user: None,
            session_id,
        })
    }
}

/// A missing header or a non-bearer scheme means anonymous; a bearer token
/// that does not verify is rejected.
fn bearer_user(parts: &Parts, tokens: &TokenKeys) -> Result<Option<AuthUser>, AppError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Invalid Authorization header".into()))?;

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Ok(None);
    };

    let claims = tokens
        .verify(token.trim())
        .ok_or_else(|| AppError::Unauthenticated("Invalid or expired token".into()))?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::Unauthenticated("Invalid user id in token".into()))?;

    Ok(Some(AuthUser {
        user_id,
        email: claims.email,
    }))
}

/// The identity resolved from `Authorization: Basic` credentials, if any.
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some((email, password)) = basic_credentials(parts) else {
            return Ok(CurrentUser(None));
        };
        let user = authenticate(state.users.as_ref(), &state.tokens, &email, &password).await?;
        Ok(CurrentUser(user))
    }
}

fn basic_credentials(parts: &Parts) -> Option<(String, String)> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    if email.is_empty() {
        return None;
    }
    Some((email.to_string(), password.to_string()))
}
