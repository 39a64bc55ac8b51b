use lettre::transport::smtp::authentication::Credentials;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1025;
pub const DEFAULT_FROM: &str = "test@example.com";
pub const DEFAULT_TO: &str = "recipient@example.com";
pub const DEFAULT_SUBJECT: &str = "Test Email";
pub const DEFAULT_BODY: &str = "This is a test email.";

/// A description of the email to send
/// and the server to send it to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EmailRequest {
    pub host: String,
    pub port: u16,
    pub from_addr: String,
    pub to_addr: String,
    /// Comma-separated `Cc` addresses, exactly as given.
    pub cc: Option<String>,
    /// Comma-separated `Bcc` addresses, exactly as given.
    pub bcc: Option<String>,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
    pub use_tls: bool,
    pub use_ssl: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    /// How many times the email is sent.
    pub count: u32,
}

impl Default for EmailRequest {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            from_addr: DEFAULT_FROM.to_string(),
            to_addr: DEFAULT_TO.to_string(),
            cc: None,
            bcc: None,
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
            is_html: false,
            use_tls: false,
            use_ssl: false,
            username: None,
            password: None,
            count: 1,
        }
    }
}

/// How the connection to the server is secured.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Security {
    /// No encryption.
    Plain,
    /// Connect in plain text and upgrade with `STARTTLS`.
    StartTls,
    /// Encrypted from the first byte.
    Implicit,
}

impl EmailRequest {
    /// The connection security requested by the flags.
    ///
    /// `use_ssl` wins over `use_tls`:
    /// when both are set no `STARTTLS` upgrade is attempted.
    pub fn security(&self) -> Security {
        if self.use_ssl {
            Security::Implicit
        } else if self.use_tls {
            Security::StartTls
        } else {
            Security::Plain
        }
    }

    /// The login credentials,
    /// only if both a username and a password were given.
    pub fn credentials(&self) -> Option<Credentials> {
        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Some(Credentials::new(
                username.to_string(),
                password.to_string(),
            )),
            _ => None,
        }
    }

    /// The `Cc` header value, if one should be set.
    pub fn cc(&self) -> Option<&str> {
        non_empty(&self.cc)
    }

    /// The `Bcc` header value, if one should be set.
    pub fn bcc(&self) -> Option<&str> {
        non_empty(&self.bcc)
    }

    /// The envelope recipients: `To`, then every `Cc`, then every `Bcc`.
    pub fn recipients(&self) -> Vec<String> {
        let mut recipients = vec![self.to_addr.clone()];
        if let Some(cc) = self.cc() {
            recipients.extend(parse_address_list(cc));
        }
        if let Some(bcc) = self.bcc() {
            recipients.extend(parse_address_list(bcc));
        }
        recipients
    }
}

/// Split a comma-separated list of addresses
/// and trim the whitespace around each one.
///
/// Empty items, as left by `a@x.com,,b@x.com` or a trailing comma, are skipped.
pub fn parse_address_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
