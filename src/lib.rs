pub mod config;
pub mod error;
pub mod mailer;
pub mod notifications;
pub mod outcome;
pub mod template;

#[cfg(test)]
mod smtp_fixture;

pub use config::MailerConfig;
pub use error::MailError;
pub use mailer::{text_fallback, Email, Mailer, TransportSecurity};
pub use notifications::{lead_notification, reservation_confirmation};
pub use outcome::SendOutcome;
pub use template::{field_text, render_template, Fields};
