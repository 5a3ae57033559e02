use std::io;

use thiserror::Error;

use crate::serial::error::SerialPortError;

/// Errors that may occur in this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The serial port could not be opened.
    /// Busy, nonexistent, or lacking permissions.
    #[error("Port `{port}` unavailable. Problem: {problem}")]
    PortUnavailable {
        /// The port we tried to open.
        port: String,

        /// What the OS said about it.
        problem: String,
    },

    /// No port was configured, and none could be discovered.
    #[error("No serial ports found, and none was configured")]
    NoPorts,

    /// Operator input did not name an entry in the list offered.
    #[error("`{0}` is not a valid index")]
    InvalidIndex(String),

    /// Reading from or writing to an open port failed.
    #[error("Transport failure")]
    Transport(#[from] SerialPortError),

    /// The device side closed the connection.
    #[error("The device closed the connection")]
    Disconnected,

    /// Reading from or writing to the operator's console failed.
    #[error("Console IO problem")]
    Console(#[source] io::Error),

    /// The configuration is not valid.
    #[error("Bad configuration: {0}")]
    BadConfig(String),
}

impl Error {
    /// If this is a [`Error::BadConfig`], get the problem description.
    pub fn try_into_bad_config(self) -> Option<String> {
        if let Self::BadConfig(problem) = self {
            Some(problem)
        } else {
            None
        }
    }
}
