use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::{console::Console, error::Error, script::Script, serial::connection::Connection};

/// Put every command of `script` on the wire, in order.
///
/// Each command is shown on the console as `n> command` (1-based) before it is written.
/// Nothing is awaited from the device in between.
pub async fn send<T, R, W>(
    connection: &mut Connection<T>,
    script: &Script,
    console: &mut Console<R, W>,
) -> Result<(), Error>
where
    T: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    for (number, command) in (1usize..).zip(&script.commands) {
        console.say(format!("{number}> {command}")).await?;

        debug!(%number, %command, port = connection.name(), "Writing command");
        connection.write_command(command).await?;
    }

    Ok(())
}
