use std::env;

use crate::error::MailError;

pub const DEFAULT_SMTP_HOST: &str = "smtp.sendgrid.net";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTP_USER: &str = "apikey";
pub const DEFAULT_FROM_NAME: &str = "Global Tierra";
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@globaltierra.com";
pub const DEFAULT_NOTIFY_EMAIL: &str = "operaciones@globaltierra.com";

/// SMTP and addressing settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from_name: String,
    pub from_email: String,
    /// Operations inbox that receives lead notifications.
    pub notify_email: String,
    /// Carbon-copy for reservation confirmations. `None` means no cc.
    pub crm_notify_email: Option<String>,
}

impl Default for MailerConfig {
    fn default() -> Self {
        MailerConfig {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: DEFAULT_SMTP_USER.to_string(),
            smtp_pass: String::new(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            notify_email: DEFAULT_NOTIFY_EMAIL.to_string(),
            crm_notify_email: None,
        }
    }
}

impl MailerConfig {
    /// Reads `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASS`, `EMAIL_FROM_NAME`,
    /// `EMAIL_FROM`, `NOTIFY_EMAIL` and `CRM_NOTIFY_EMAIL` from the process environment.
    pub fn from_env() -> Result<Self, MailError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`MailerConfig::from_env`] but against an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = MailerConfig::default();
        let or_default = |key: &str, default: String| lookup(key).unwrap_or(default);

        let smtp_port = match lookup("SMTP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                MailError::Config(format!("SMTP_PORT must be a port number, got {raw:?}: {e}"))
            })?,
            None => defaults.smtp_port,
        };

        Ok(MailerConfig {
            smtp_host: or_default("SMTP_HOST", defaults.smtp_host),
            smtp_port,
            smtp_user: or_default("SMTP_USER", defaults.smtp_user),
            smtp_pass: or_default("SMTP_PASS", defaults.smtp_pass),
            from_name: or_default("EMAIL_FROM_NAME", defaults.from_name),
            from_email: or_default("EMAIL_FROM", defaults.from_email),
            notify_email: or_default("NOTIFY_EMAIL", defaults.notify_email),
            crm_notify_email: lookup("CRM_NOTIFY_EMAIL").filter(|cc| !cc.trim().is_empty()),
        })
    }

    /// Login is attempted only when both user and password are set.
    pub fn has_credentials(&self) -> bool {
        !self.smtp_user.is_empty() && !self.smtp_pass.is_empty()
    }
}
