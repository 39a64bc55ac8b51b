use lettre::address::Envelope;

/// An email ready to be sent.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Email {
    /// The SMTP envelope.
    ///
    /// The recipients are the `To` address followed by
    /// every `Cc` and `Bcc` address.
    pub envelope: Envelope,

    /// The complete MIME message, headers included.
    pub formatted: Vec<u8>,
}

impl Email {
    /// The envelope sender.
    pub fn address_from(&self) -> Option<String> {
        self.envelope.from().map(|address| address.to_string())
    }

    /// The envelope recipients, in order.
    pub fn addresses_to(&self) -> Vec<String> {
        self.envelope
            .to()
            .iter()
            .map(|address| address.to_string())
            .collect()
    }

    /// The formatted message as text.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.formatted).into_owned()
    }
}
