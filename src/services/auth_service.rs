use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{AuthenticatedUser, User},
    repository::UserRepository,
    response::LoginBody,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// Signs and verifies the bearer tokens handed out at login.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    /// Returns the claims of a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .ok()
    }
}

/// Checks an email/password pair against the stored argon2 hash.
///
/// Unknown emails, wrong passwords and unreadable hashes all resolve to
/// `None`: the caller simply has no identity.
pub async fn authenticate(
    users: &dyn UserRepository,
    tokens: &TokenKeys,
    email: &str,
    password: &str,
) -> AppResult<Option<AuthenticatedUser>> {
    let Some(user) = users.find_by_email(email).await? else {
        tracing::debug!(%email, "login for unknown user");
        return Ok(None);
    };

    let parsed_hash = match PasswordHash::new(&user.password_hash) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::warn!(user_id = user.id, error = %err, "stored password hash is invalid");
            return Ok(None);
        }
    };

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        tracing::debug!(user_id = user.id, "login with wrong password");
        return Ok(None);
    }

    let token = tokens.issue(&user)?;
    Ok(Some(AuthenticatedUser { user, token }))
}

pub fn login(identity: Option<&AuthenticatedUser>) -> AppResult<LoginBody> {
    let Some(identity) = identity else {
        return Err(AppError::Unauthenticated("missing credentials".into()));
    };

    tracing::info!(user = %identity.identifier(), "user logged in");
    Ok(LoginBody {
        user: identity.identifier().to_string(),
        token: identity.token().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 42,
            email: "ferris@example.com".into(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let keys = TokenKeys::new("secret", 1);
        let token = keys.issue(&user()).unwrap();

        let claims = keys.verify(&token).expect("valid token");
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "ferris@example.com");
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = TokenKeys::new("secret", 1).issue(&user()).unwrap();
        assert!(TokenKeys::new("other", 1).verify(&token).is_none());
    }
}
