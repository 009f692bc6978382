use async_trait::async_trait;
use cart_api::mail::{MailError, MailMessage, Mailer};
use tokio::sync::Mutex;

/// Keeps every message it is handed.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        self.sent.lock().await.push(message);
        Ok(())
    }
}
