#![allow(dead_code)]

use std::time::Duration;

use superres_scripts::{console::Console, script::Script, serial::connection::Connection};
use tokio::{
    io::{AsyncReadExt, DuplexStream},
    time::timeout,
};

/// A connection backed by an in-memory pipe.
/// The returned stream is the device end.
pub fn connect() -> (Connection<DuplexStream>, DuplexStream) {
    let (ours, device) = tokio::io::duplex(4096);

    (Connection::new("mock", ours), device)
}

/// A console which answers prompts from `input` and keeps what is printed.
pub fn console(input: &'static str) -> Console<&'static [u8], Vec<u8>> {
    Console::new(input.as_bytes(), Vec::new())
}

pub fn printed<R>(console: &Console<R, Vec<u8>>) -> String {
    String::from_utf8_lossy(console.output()).to_string()
}

/// Everything the device has received so far.
pub async fn drain(device: &mut DuplexStream) -> Vec<u8> {
    let mut received = vec![];
    let mut buf = [0u8; 1024];

    while let Ok(Ok(n)) = timeout(Duration::from_millis(100), device.read(&mut buf)).await {
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }

    received
}

/// What the wire should carry for a script.
pub fn wire_bytes(script: &Script) -> Vec<u8> {
    script
        .commands
        .iter()
        .flat_map(|command| format!("{command}\n").into_bytes())
        .collect()
}
