use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tokio_util::codec::{Decoder, Framed};
use tracing::{debug, info};

use crate::{
    error::Error,
    script::Command,
    serial::{codecs::lines::LinesCodec, error::SerialPortError, SerialMessage},
};

/// The baud rate the controller firmware runs at.
pub const DEFAULT_BAUD: u32 = 38_400;

/// An open, exclusively owned line based connection to a device.
///
/// Generic over the transport so that sessions may run on top of
/// an in-memory pipe instead of a real serial port.
#[derive(Debug)]
pub struct Connection<T> {
    name: String,
    framed: Framed<T, LinesCodec>,
}

fn port_unavailable(port: &str, e: impl std::fmt::Display) -> Error {
    Error::PortUnavailable {
        port: port.to_string(),
        problem: e.to_string(),
    }
}

impl Connection<SerialStream> {
    /// Open the serial port at `port` using 8N1 framing and no flow control.
    ///
    /// Anything buffered on the port before we got here is discarded.
    pub fn open(port: &str, baud: u32) -> Result<Self, Error> {
        info!(%port, %baud, "Opening port");

        let stream = tokio_serial::new(port, baud)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| port_unavailable(port, e))?;

        stream
            .clear(tokio_serial::ClearBuffer::Input)
            .map_err(|e| port_unavailable(port, e))?;

        debug!(%port, "Cleared stale input");

        Ok(Self::new(port, stream))
    }
}

impl<T> Connection<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already open transport.
    pub fn new(name: impl Into<String>, io: T) -> Self {
        Self {
            name: name.into(),
            framed: LinesCodec::default().framed(io),
        }
    }

    /// What this connection is attached to, e.g. `/dev/ttyACM0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Put a command on the wire, followed by a single line terminator.
    pub async fn write_command(&mut self, command: &Command) -> Result<(), SerialPortError> {
        self.framed.send(command).await
    }

    /// Wait for the next line from the device.
    /// `None` means the transport reached end of stream.
    pub async fn next_line(&mut self) -> Option<Result<SerialMessage, SerialPortError>> {
        self.framed
            .next()
            .await
            .map(|line| line.map(SerialMessage::new_lossy))
    }
}
