//! Cookie sessions carrying the anonymous cart key.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::db::DbPool;

pub const SESSION_COOKIE_NAME: &str = "cart_session";

/// Sessions expire after a week of inactivity.
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Creates the PostgreSQL session store and its table.
pub async fn create_session_store(pool: &DbPool) -> anyhow::Result<PostgresStore> {
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    secure: bool,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
