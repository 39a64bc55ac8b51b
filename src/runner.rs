use std::{io::Write, process::ExitCode};

use chrono::Local;
use tracing::Instrument;

use crate::{build, smtp, EmailRequest};

const RULE_WIDTH: usize = 60;

/// The outcome of a batch of send attempts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Summary {
    pub sent: u32,
    pub total: u32,
}

impl Summary {
    /// Whether every attempt succeeded.
    pub fn is_success(&self) -> bool {
        self.sent == self.total
    }

    /// The process exit code: success only if every attempt succeeded.
    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Send the email described by `request`, `request.count` times.
///
/// Every attempt builds a fresh message and uses its own connection.
/// Attempts run one after another; a failed attempt
/// is reported and the batch moves on.
pub async fn run(
    request: &EmailRequest,
    mut out: impl Write,
    mut err: impl Write,
) -> Summary {
    let total = request.count;
    let mut sent = 0;
    for i in 1..=total {
        if total > 1 {
            banner(&mut out, &format!("Sending email {i}/{total}"));
        }
        let span = tracing::debug_span!("attempt", number = i, of = total);
        if attempt(request, &mut out, &mut err)
            .instrument(span)
            .await
            .is_ok()
        {
            sent += 1;
        }
    }
    if total > 1 {
        banner(
            &mut out,
            &format!("Summary: {sent}/{total} emails sent successfully"),
        );
    }
    let summary = Summary { sent, total };
    tracing::debug!(?summary, "batch finished");
    summary
}

async fn attempt(
    request: &EmailRequest,
    mut out: impl Write,
    mut err: impl Write,
) -> smtp::SendResult {
    let email = match build::build(request, &Local::now()) {
        Ok(email) => email,
        Err(error) => {
            let error = smtp::Error::from(error);
            smtp::say(
                &mut err,
                format_args!("✗ Error sending email: {error}"),
            );
            return Err(error);
        }
    };
    smtp::send(request, email, &mut out, &mut err).await
}

fn banner(out: impl Write, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    smtp::say(out, format_args!("\n{rule}\n{title}\n{rule}"));
}
