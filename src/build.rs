use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use lettre::{
    address::{AddressError, Envelope},
    message::{
        header::{self, HeaderName, HeaderValue, Headers},
        Mailbox, MultiPart, SinglePart,
    },
    Address,
};

use crate::{Email, EmailRequest};

/// The format of the `Date` header.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// An error while assembling the envelope of an email.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error(transparent)]
    Envelope(#[from] lettre::error::Error),
}

/// The body of an email.
enum Body {
    Text(SinglePart),
    Alternative(MultiPart),
}

impl Body {
    fn new(body: &str, is_html: bool) -> Self {
        if is_html {
            Body::Alternative(
                MultiPart::alternative().singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_HTML)
                        .body(body.to_string()),
                ),
            )
        } else {
            Body::Text(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .body(body.to_string()),
            )
        }
    }

    fn formatted(&self) -> Vec<u8> {
        match self {
            Body::Text(part) => part.formatted(),
            Body::Alternative(part) => part.formatted(),
        }
    }
}

/// Build the email described by `request`,
/// dated `date`.
///
/// The `From`, `To`, `Cc` and `Bcc` headers carry the addresses
/// exactly as given. The addresses are only validated
/// when the envelope is assembled.
pub fn build<Tz>(
    request: &EmailRequest,
    date: &DateTime<Tz>,
) -> Result<Email, Error>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut headers = Headers::new();
    insert(&mut headers, "Subject", &request.subject);
    insert(&mut headers, "From", &request.from_addr);
    insert(&mut headers, "To", &request.to_addr);
    insert(&mut headers, "Date", &format_date(date));
    if let Some(cc) = request.cc() {
        insert(&mut headers, "Cc", cc);
    }
    // kept in the message, relays are expected to strip it
    if let Some(bcc) = request.bcc() {
        insert(&mut headers, "Bcc", bcc);
    }
    headers.set(header::MIME_VERSION_1_0);

    let mut formatted = headers.to_string().into_bytes();
    formatted.extend(Body::new(&request.body, request.is_html).formatted());

    let envelope = envelope(request)?;
    tracing::debug!(
        from = %request.from_addr,
        recipients = ?request.recipients(),
        size = formatted.len(),
        "built email"
    );
    Ok(Email {
        envelope,
        formatted,
    })
}

/// Format `date` for the `Date` header.
pub fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.format(DATE_FORMAT).to_string()
}

fn insert(headers: &mut Headers, name: &'static str, value: &str) {
    headers.insert_raw(HeaderValue::new(
        HeaderName::new_from_ascii_str(name),
        value.to_string(),
    ));
}

fn envelope(request: &EmailRequest) -> Result<Envelope, Error> {
    let from = parse_address(&request.from_addr)?;
    let to = request
        .recipients()
        .iter()
        .map(|address| parse_address(address))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Envelope::new(Some(from), to)?)
}

/// Parse a bare address or a mailbox such as `Bob <bob@example.com>`.
fn parse_address(address: &str) -> Result<Address, Error> {
    address
        .parse::<Mailbox>()
        .map(|mailbox| mailbox.email)
        .map_err(|source| Error::Address {
            address: address.to_string(),
            source,
        })
}
