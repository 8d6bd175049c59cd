use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("invalid address: no recipient given")]
    NoRecipient,

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("send task failed: {0}")]
    Task(String),
}
