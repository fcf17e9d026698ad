use bytes::Bytes;
use hmac::Mac;

/// Body of a signed message.
///
/// `Absent` means the body takes no part in the MAC at all. It is not the
/// same thing as a placeholder serialization of "nothing" such as `{}`,
/// `null` or a blank string, all of which are real bytes that get hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Present(Bytes),
    Absent,
}

impl Body {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Present(bytes) => Some(bytes),
            Body::Absent => None,
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Present(Bytes::from(bytes))
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Present(bytes)
    }
}

/// The fields covered by a signature, in signing order.
///
/// Fields are concatenated as-is: timestamp, then endpoint, then the body
/// when there is one. No separators, no re-encoding. Header fields are the
/// bytes as received, so they need not be UTF-8.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalMessage<'a> {
    timestamp: &'a [u8],
    endpoint: &'a [u8],
    body: Option<&'a [u8]>,
}

impl<'a> CanonicalMessage<'a> {
    pub fn new(timestamp: &'a [u8], endpoint: &'a [u8], body: Option<&'a [u8]>) -> Self {
        Self {
            timestamp,
            endpoint,
            body,
        }
    }

    /// Stream the message into a MAC without building an intermediate buffer.
    pub fn feed<M: Mac>(&self, mac: &mut M) {
        mac.update(self.timestamp);
        mac.update(self.endpoint);
        if let Some(body) = self.body {
            mac.update(body);
        }
    }

    #[cfg(test)]
    fn to_bytes(&self) -> Vec<u8> {
        [self.timestamp, self.endpoint, self.body.unwrap_or_default()].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::Hmac;
    use sha2::Sha256;

    #[test]
    fn concatenates_without_delimiters() {
        let message = CanonicalMessage::new(
            b"1610000000",
            b"authorizations",
            Some(br#"{"status":"APPROVED"}"#),
        );
        assert_eq!(
            message.to_bytes(),
            br#"1610000000authorizations{"status":"APPROVED"}"#.to_vec()
        );
    }

    #[test]
    fn absent_body_contributes_nothing() {
        let message = CanonicalMessage::new(b"1610000000", b"authorizations", None);
        assert_eq!(message.to_bytes(), b"1610000000authorizations".to_vec());
    }

    #[test]
    fn header_bytes_are_taken_verbatim() {
        let message = CanonicalMessage::new(b"1", b"caf\xe9", None);
        assert_eq!(message.to_bytes(), b"1caf\xe9".to_vec());
    }

    #[test]
    fn feed_matches_buffered_bytes() {
        let message = CanonicalMessage::new(b"42", b"adjustments", Some(b"payload"));

        let mut streamed = Hmac::<Sha256>::new_from_slice(b"key").unwrap();
        message.feed(&mut streamed);

        let mut buffered = Hmac::<Sha256>::new_from_slice(b"key").unwrap();
        buffered.update(&message.to_bytes());

        assert_eq!(streamed.finalize().into_bytes(), buffered.finalize().into_bytes());
    }

    #[test]
    fn body_conversions() {
        assert_eq!(Body::from(b"{}".to_vec()).as_bytes(), Some(&b"{}"[..]));
        assert_eq!(Body::Absent.as_bytes(), None);
        assert_eq!(Body::from(Vec::new()).as_bytes(), Some(&b""[..]));
    }
}
