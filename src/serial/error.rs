use std::io;

use thiserror::Error;

/// Problems on the wire, after a port has been opened.
#[derive(Debug, Error)]
pub enum SerialPortError {
    /// IO related errors.
    #[error("Underlying IO problem")]
    IO(#[from] io::Error),
}
