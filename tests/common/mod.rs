#![allow(dead_code)]

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use cart_api::{
    middleware::auth::{AuthUser, Identity},
    models::User,
    services::auth_service::TokenKeys,
    state::AppState,
};

mod mailer;
mod memory;

pub use mailer::RecordingMailer;
pub use memory::InMemoryStore;

pub const JWT_SECRET: &str = "test-secret";
pub const MAIL_FROM: &str = "no-reply@cart-api.test";

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let mailer = Arc::new(RecordingMailer::new());
    let state = AppState::from_store(
        store.clone(),
        mailer.clone(),
        TokenKeys::new(JWT_SECRET, 1),
        MAIL_FROM,
    );
    TestApp {
        state,
        store,
        mailer,
    }
}

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hash password")
        .to_string()
}

pub fn identity_for(user: &User) -> Identity {
    Identity::user(AuthUser {
        user_id: user.id,
        email: user.email.clone(),
    })
}
