use std::time::Duration;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::Notify,
};
use tracing::{debug, error, info_span, trace, warn, Instrument};

use crate::{
    console::Console,
    error::Error,
    serial::{connection::Connection, error::SerialPortError, SerialMessage},
};

/// Why echoing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoOutcome {
    /// The operator asked to stop.
    Interrupted,

    /// Nothing arrived within the idle timeout.
    Idle,

    /// The device side reached end of stream.
    Closed,
}

enum Event {
    ThisCameFromWire(Option<Result<SerialMessage, SerialPortError>>),
    Idle,
    Interrupted,
}

async fn next_event<T>(
    connection: &mut Connection<T>,
    idle_timeout: Option<Duration>,
    interrupt: &Notify,
) -> Event
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let from_wire = async {
        match idle_timeout {
            Some(idle) => tokio::time::timeout(idle, connection.next_line())
                .await
                .map_or(Event::Idle, Event::ThisCameFromWire),
            None => Event::ThisCameFromWire(connection.next_line().await),
        }
    };

    tokio::select! {
        _ = interrupt.notified() => Event::Interrupted,
        event = from_wire => event,
    }
}

/// Print every line the device sends.
///
/// Lines are not printed byte for byte: the `\n` delimiter and one trailing `\r`
/// are dropped, and invalid UTF-8 is replaced with `U+FFFD`.
///
/// Without an idle timeout this only returns when `interrupt` is notified,
/// or when the transport ends or fails.
pub async fn echo<T, R, W>(
    connection: &mut Connection<T>,
    console: &mut Console<R, W>,
    idle_timeout: Option<Duration>,
    interrupt: &Notify,
) -> Result<EchoOutcome, Error>
where
    T: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    let span = info_span!("echo", port = %connection.name());

    async move {
        debug!(?idle_timeout, "Echoing");

        loop {
            match next_event(connection, idle_timeout, interrupt).await {
                Event::ThisCameFromWire(Some(Ok(message))) => {
                    trace!("Message from port: `{message}`");
                    console.say(&message).await?;
                }
                Event::ThisCameFromWire(Some(Err(e))) => {
                    error!(?e, "Serial port error");
                    return Err(e.into());
                }
                Event::ThisCameFromWire(None) => {
                    warn!("Port closed");
                    return Ok(EchoOutcome::Closed);
                }
                Event::Idle => {
                    debug!("Idle");
                    return Ok(EchoOutcome::Idle);
                }
                Event::Interrupted => {
                    debug!("Interrupted");
                    return Ok(EchoOutcome::Interrupted);
                }
            }
        }
    }
    .instrument(span)
    .await
}
