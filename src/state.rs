use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::OrmConn,
    mail::{LogMailer, MailError, Mailer, SmtpMailer},
    repository::{
        CartLineRepository, CartRepository, OrmStore, ProductRepository, UnitOfWork,
        UserRepository,
    },
    services::auth_service::TokenKeys,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub cart_lines: Arc<dyn CartLineRepository>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: TokenKeys,
    pub mail_from: String,
}

impl AppState {
    /// Wires every port to a single store such as [`OrmStore`].
    pub fn from_store<S>(
        store: Arc<S>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenKeys,
        mail_from: impl Into<String>,
    ) -> Self
    where
        S: UserRepository
            + ProductRepository
            + CartRepository
            + CartLineRepository
            + UnitOfWork
            + 'static,
    {
        Self {
            users: store.clone(),
            products: store.clone(),
            carts: store.clone(),
            cart_lines: store.clone(),
            unit_of_work: store,
            mailer,
            tokens,
            mail_from: mail_from.into(),
        }
    }

    pub fn from_config(config: &AppConfig, orm: OrmConn) -> Result<Self, MailError> {
        let mailer: Arc<dyn Mailer> = match &config.smtp_url {
            Some(url) => Arc::new(SmtpMailer::from_url(url)?),
            None => {
                tracing::warn!("SMTP_URL is not set, confirmation mails will only be logged");
                Arc::new(LogMailer)
            }
        };
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl_hours);
        Ok(Self::from_store(
            Arc::new(OrmStore::new(orm)),
            mailer,
            tokens,
            config.mail_from.clone(),
        ))
    }
}
