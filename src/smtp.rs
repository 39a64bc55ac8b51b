use std::{fmt, io::Write, time::Duration};

use lettre::transport::smtp::{
    authentication::DEFAULT_MECHANISMS,
    client::{AsyncSmtpConnection, TlsParameters},
    extension::ClientId,
};

use crate::{config::Security, Email, EmailRequest};

/// How long to wait on the server, the same as lettre's transports.
const TIMEOUT: Duration = Duration::from_secs(60);

/// The outcome of a single send attempt.
pub type SendResult = Result<(), Error>;

/// An error while sending an email.
///
/// Every failure of an attempt ends up here;
/// it is reported with its message and the attempt is counted as failed.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] crate::build::Error),
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Write one line of user-facing output.
///
/// A closed output stream does not fail the attempt.
pub(crate) fn say(mut out: impl Write, line: fmt::Arguments<'_>) {
    if let Err(error) = writeln!(out, "{line}") {
        tracing::debug!(?error, "failed to write output");
    }
}

/// Send `email` once to the server described by `request`.
///
/// Each progress line is written to `out` just before its step runs,
/// the failure reason goes to `err`.
/// The connection is closed after the attempt, whether it succeeded or not.
pub async fn send(
    request: &EmailRequest,
    email: Email,
    mut out: impl Write,
    mut err: impl Write,
) -> SendResult {
    let result = try_send(request, &email, &mut out).await;
    match &result {
        Ok(()) => report_sent(request, &mut out),
        Err(error) => {
            tracing::debug!(?error, "send failed");
            say(&mut err, format_args!("✗ Error sending email: {error}"));
        }
    }
    result
}

async fn try_send(
    request: &EmailRequest,
    email: &Email,
    mut out: impl Write,
) -> SendResult {
    say(
        &mut out,
        format_args!(
            "Connecting to SMTP server at {}:{}...",
            request.host, request.port
        ),
    );
    let security = request.security();
    tracing::debug!(?security, "connection security");
    let hello_name = ClientId::default();
    let tls_parameters = match security {
        Security::Implicit => Some(TlsParameters::new(request.host.clone())?),
        Security::Plain | Security::StartTls => None,
    };
    let mut connection = AsyncSmtpConnection::connect_tokio1(
        (request.host.as_str(), request.port),
        Some(TIMEOUT),
        &hello_name,
        tls_parameters,
        None,
    )
    .await?;

    match exchange(&mut connection, request, email, &hello_name, &mut out)
        .await
    {
        Ok(()) => {
            connection.quit().await?;
            Ok(())
        }
        Err(error) => {
            connection.abort().await;
            Err(error)
        }
    }
}

/// Run the session on an open connection, up to the accepted message.
async fn exchange(
    connection: &mut AsyncSmtpConnection,
    request: &EmailRequest,
    email: &Email,
    hello_name: &ClientId,
    mut out: impl Write,
) -> SendResult {
    if request.security() == Security::StartTls {
        say(&mut out, format_args!("Starting TLS..."));
        connection
            .starttls(TlsParameters::new(request.host.clone())?, hello_name)
            .await?;
    }
    if let Some(credentials) = request.credentials() {
        let username = request.username.as_deref().unwrap_or_default();
        say(&mut out, format_args!("Authenticating as {username}..."));
        connection.auth(DEFAULT_MECHANISMS, &credentials).await?;
    }

    say(
        &mut out,
        format_args!(
            "Sending email from {} to {}...",
            request.from_addr, request.to_addr
        ),
    );
    let response = connection.send(&email.envelope, &email.formatted).await?;
    tracing::debug!(code = %response.code(), "server accepted email");
    Ok(())
}

fn report_sent(request: &EmailRequest, mut out: impl Write) {
    let mut report = String::from("✓ Email sent successfully!\n\nDetails:\n");
    report += &format!("  From: {}\n", request.from_addr);
    report += &format!("  To: {}\n", request.to_addr);
    if let Some(cc) = request.cc() {
        report += &format!("  Cc: {cc}\n");
    }
    if let Some(bcc) = request.bcc() {
        report += &format!("  Bcc: {bcc}\n");
    }
    report += &format!("  Subject: {}\n", request.subject);
    report += &format!(
        "  Body length: {} characters",
        request.body.chars().count()
    );
    say(&mut out, format_args!("{report}"));
}
