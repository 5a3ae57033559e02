use std::fmt::Display;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

use crate::error::Error;

/// The operator's side of the conversation: prompts go out, answers come in.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

/// A console on the process' standard input and output.
pub type Stdio = Console<BufReader<Stdin>, Stdout>;

impl Stdio {
    /// Attach to stdin and stdout.
    pub fn stdio() -> Self {
        Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Console<R, W> {
    /// Make a console from any reader/writer pair.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// What has been written so far, for writers that keep it.
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R, W> Console<R, W>
where
    W: AsyncWrite + Unpin,
{
    /// Print a line.
    pub async fn say(&mut self, line: impl Display) -> Result<(), Error> {
        self.output
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(Error::Console)?;

        self.output.flush().await.map_err(Error::Console)
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Print `text` without a newline, then wait for a line of input.
    ///
    /// `None` when input has ended.
    pub async fn prompt(&mut self, text: &str) -> Result<Option<String>, Error> {
        self.output
            .write_all(text.as_bytes())
            .await
            .map_err(Error::Console)?;
        self.output.flush().await.map_err(Error::Console)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .map_err(Error::Console)?;

        if read == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}
