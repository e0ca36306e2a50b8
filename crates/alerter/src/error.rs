use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlerterError {
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Failed to build the alert email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Alerter is not configured. Missing SMTP host or recipients.")]
    NotConfigured,
}
