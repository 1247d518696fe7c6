use thiserror::Error;

/// Where a customer notification goes.
#[derive(Debug, PartialEq, Clone)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Notification {
    pub to: Recipient,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn purchase_confirmation(to: Recipient) -> Self {
        let body = format!(
            "Hey {},\n\nYou just bought an item from our shop. Thank you for making this order.\n\nRegards",
            to.name
        );
        Self {
            to,
            subject: "Thank you for shopping with us".to_string(),
            body,
        }
    }
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum MailError {
    #[error("mail rejected: {0}")]
    Rejected(String),
    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
    #[error("mail transport did not answer within {0} ms")]
    Timeout(u64),
}
