//! This crate provides a small client that sends test emails
//! to an SMTP server, typically a local mock server.
//!
//! Each send builds a fresh message, opens its own connection
//! (plain, `STARTTLS` or implicit TLS), optionally logs in,
//! delivers the message and closes the connection again.
//! A batch of sends is run strictly in sequence and
//! summarized by a [`Summary`].
//!
//! # Examples
//!
//! ```no_run
//! # tokio_test::block_on(async {
//! use smtp_test_tool::{run, EmailRequest};
//!
//! let request = EmailRequest {
//!     port: 2525,
//!     cc: Some("copy@example.com".to_string()),
//!     count: 3,
//!     ..Default::default()
//! };
//!
//! let summary = run(&request, std::io::stdout(), std::io::stderr()).await;
//! println!("{}/{} emails sent", summary.sent, summary.total);
//! # })
//! ```
//!
//! Messages can also be built without sending them:
//!
//! ```
//! use smtp_test_tool::{build, EmailRequest};
//!
//! let request = EmailRequest {
//!     body: "<b>hi</b>".to_string(),
//!     is_html: true,
//!     ..Default::default()
//! };
//! let email = build(&request, &chrono::Local::now()).unwrap();
//! assert!(email.to_text().contains("text/html"));
//! assert_eq!(email.addresses_to(), vec!["recipient@example.com"]);
//! ```

#![forbid(unsafe_code)]

pub mod build;
pub mod cli;
pub mod config;
mod email;
pub mod logging;
mod runner;
pub mod smtp;

pub use build::build;
pub use cli::Args;
pub use config::{parse_address_list, EmailRequest, Security};
pub use email::Email;
pub use runner::{run, Summary};
pub use smtp::{send, Error, SendResult};
