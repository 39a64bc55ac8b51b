use clap::{ArgAction, Parser};
use tracing::metadata::LevelFilter;

use crate::{config, EmailRequest};

const EXAMPLES: &str = "\
Examples:
  # Basic test email to localhost:1025
  smtp-test-tool

  # Custom SMTP server
  smtp-test-tool --host smtp.example.com --port 587

  # Send HTML email
  smtp-test-tool --html --body \"<h1>Hello</h1><p>This is a test.</p>\"

  # With authentication
  smtp-test-tool --username user@example.com --password secret123

  # Multiple recipients
  smtp-test-tool --to user1@example.com --cc \"user2@example.com,user3@example.com\"";

/// Send test emails to your mock SMTP server
#[derive(Parser, Debug, Clone)]
#[command(version, about, after_help = EXAMPLES)]
pub struct Args {
    /// SMTP server host
    #[arg(long, default_value = config::DEFAULT_HOST, help_heading = "Server")]
    pub host: String,

    /// SMTP server port
    #[arg(long, default_value_t = config::DEFAULT_PORT, help_heading = "Server")]
    pub port: u16,

    /// Use STARTTLS
    #[arg(long, help_heading = "Server")]
    pub tls: bool,

    /// Use SSL/TLS connection
    #[arg(long, help_heading = "Server")]
    pub ssl: bool,

    /// SMTP username
    #[arg(long, help_heading = "Authentication")]
    pub username: Option<String>,

    /// SMTP password
    #[arg(long, help_heading = "Authentication")]
    pub password: Option<String>,

    /// From address
    #[arg(long = "from", default_value = config::DEFAULT_FROM, help_heading = "Email")]
    pub from_addr: String,

    /// To address
    #[arg(long = "to", default_value = config::DEFAULT_TO, help_heading = "Email")]
    pub to_addr: String,

    /// Cc addresses (comma-separated)
    #[arg(long, help_heading = "Email")]
    pub cc: Option<String>,

    /// Bcc addresses (comma-separated)
    #[arg(long, help_heading = "Email")]
    pub bcc: Option<String>,

    /// Email subject
    #[arg(long, default_value = config::DEFAULT_SUBJECT, help_heading = "Email")]
    pub subject: String,

    /// Email body
    #[arg(long, default_value = config::DEFAULT_BODY, help_heading = "Email")]
    pub body: String,

    /// Send as HTML email
    #[arg(long, help_heading = "Email")]
    pub html: bool,

    /// Number of emails to send
    #[arg(long, default_value_t = 1, help_heading = "Batch")]
    pub count: u32,

    /// Log diagnostics to stderr (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// The email request described by these arguments.
    pub fn into_request(self) -> EmailRequest {
        EmailRequest {
            host: self.host,
            port: self.port,
            from_addr: self.from_addr,
            to_addr: self.to_addr,
            cc: self.cc,
            bcc: self.bcc,
            subject: self.subject,
            body: self.body,
            is_html: self.html,
            use_tls: self.tls,
            use_ssl: self.ssl,
            username: self.username,
            password: self.password,
            count: self.count,
        }
    }

    /// The level of diagnostic logging.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
