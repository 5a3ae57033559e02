use std::{sync::Arc, time::Duration};

use tokio::{
    io::{AsyncBufRead, AsyncRead, AsyncWrite},
    sync::Notify,
};
use tracing::{debug, info};

use crate::{
    console::Console,
    echo::{self, EchoOutcome},
    error::Error,
    script::ScriptTable,
    sender,
    serial::connection::Connection,
};

/// Asks the operator which script to send.
pub const PROMPT: &str = "Please enter a number: ";

/// Shown when the operator's answer does not name a script.
pub const INVALID_INDEX: &str = "Not valid index for script_# ";

/// The interactive loop.
///
/// Owns the connection for as long as the session runs.
/// Each round: prompt for a script index, send that script, then echo
/// what the device says until interrupted (or idle, if a timeout is set).
pub struct Session<T, R, W> {
    connection: Connection<T>,
    table: ScriptTable,
    console: Console<R, W>,
    echo_idle_timeout: Option<Duration>,
    interrupt: Arc<Notify>,
}

impl<T, R, W> Session<T, R, W>
where
    T: AsyncRead + AsyncWrite + Unpin,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a session. Notifying `interrupt` stops an ongoing echo,
    /// or ends the session if the operator is being prompted.
    pub fn new(
        connection: Connection<T>,
        table: ScriptTable,
        console: Console<R, W>,
        interrupt: Arc<Notify>,
    ) -> Self {
        Self {
            connection,
            table,
            console,
            echo_idle_timeout: None,
            interrupt,
        }
    }

    /// Go back to the prompt after this long without hearing from the device.
    /// `None` echoes until interrupted.
    pub fn with_echo_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.echo_idle_timeout = idle_timeout;
        self
    }

    /// The operator's console.
    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    /// Run until input ends or the operator interrupts at the prompt.
    ///
    /// Transport errors end the session.
    pub async fn run(&mut self) -> Result<(), Error> {
        info!(port = self.connection.name(), scripts = self.table.len(), "Session started");

        loop {
            let input = tokio::select! {
                input = self.console.prompt(PROMPT) => input?,
                _ = self.interrupt.notified() => {
                    info!("Interrupted at prompt, quitting");
                    return Ok(());
                }
            };

            let Some(input) = input else {
                info!("End of input, quitting");
                return Ok(());
            };

            let (index, script) = match self.table.select(&input) {
                Ok(selected) => selected,
                Err(Error::InvalidIndex(_)) => {
                    self.console.say(INVALID_INDEX).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            info!(%index, script = %script.name, "Sending script");
            sender::send(&mut self.connection, script, &mut self.console).await?;

            match echo::echo(
                &mut self.connection,
                &mut self.console,
                self.echo_idle_timeout,
                &self.interrupt,
            )
            .await?
            {
                EchoOutcome::Closed => return Err(Error::Disconnected),
                outcome => debug!(?outcome, "Back to prompt"),
            }
        }
    }
}
