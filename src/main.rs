use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tour_mailer::{Fields, Mailer, MailerConfig};
use tracing_subscriber::EnvFilter;

/// Sends the tour-booking transactional emails using the SMTP settings in the environment.
#[derive(Parser)]
#[command(name = "tour-mailer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Notify the operations inbox about a new lead.
    Lead {
        /// JSON object with the lead fields, or `-` for stdin.
        payload: PathBuf,
    },
    /// Send a reservation confirmation to the customer in `cliente_correo`.
    Reservation {
        /// JSON object with the reservation fields, or `-` for stdin.
        payload: PathBuf,
    },
    /// Send an arbitrary message.
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        html: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        cc: Option<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mailer = Mailer::new(MailerConfig::from_env()?);

    let outcome = match cli.command {
        Command::Lead { payload } => mailer.send_lead_notification(&read_fields(&payload)?)?,
        Command::Reservation { payload } => {
            mailer.send_reservation_confirmation(&read_fields(&payload)?)?
        }
        Command::Send {
            to,
            subject,
            html,
            text,
            cc,
        } => mailer.send_email(&subject, &to, &html, text.as_deref(), cc.as_deref()),
    };

    println!("{}", serde_json::to_string(&outcome)?);

    Ok(if outcome.is_sent() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_fields(path: &Path) -> anyhow::Result<Fields> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        raw
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };

    serde_json::from_str(&raw).context("payload must be a JSON object")
}
