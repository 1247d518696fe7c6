use crate::domain::notification::{MailError, Notification};
use crate::domain::ports::Mailer;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Delivers notifications to the log instead of an SMTP relay.
///
/// Every delivered message is also kept in memory for inspection.
#[derive(Default, Clone)]
pub struct LogMailer {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, notification: Notification) -> Result<(), MailError> {
        if !notification.to.email.contains('@') {
            return Err(MailError::Rejected(format!(
                "invalid recipient address {:?}",
                notification.to.email
            )));
        }

        info!(
            to = %notification.to.email,
            subject = %notification.subject,
            "mail delivered"
        );
        self.sent.lock().await.push(notification);
        Ok(())
    }
}
