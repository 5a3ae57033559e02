use std::fmt::Display;

/// Serial port related errors.
pub mod error;

/// The serial connection owned by a session.
pub mod connection;

/// Codecs for encoding/decoding messages to/from wire.
pub mod codecs;

/// A line received from the device, without its delimiter.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SerialMessage(String);

impl SerialMessage {
    /// Create a serial message from bytes, ignoring any bad utf8 bytes.
    /// A trailing carriage return is dropped.
    pub fn new_lossy<B: AsRef<[u8]>>(bytes: B) -> Self {
        let bytes = bytes.as_ref();
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);

        Self(String::from_utf8_lossy(bytes).to_string())
    }

    /// Borrowed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SerialMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
