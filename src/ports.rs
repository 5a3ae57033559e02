use std::{fmt::Display, io};

use serialport::{SerialPortInfo, SerialPortType};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::{console::Console, error::Error};

/// Shown when asking the operator to pick one of several ports.
pub const PORT_PROMPT: &str = "Please select a port: ";

/// A serial port visible to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Likely "/dev/ttyACMx", "/dev/cu.usbmodemx" or "COMx".
    pub name: String,

    /// Human readable description of what kind of port this is.
    pub kind: String,
}

impl PortDescriptor {
    /// Describe a port by hand.
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

impl From<SerialPortInfo> for PortDescriptor {
    fn from(info: SerialPortInfo) -> Self {
        let kind = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let mut kind = format!("USB {:04x}:{:04x}", usb.vid, usb.pid);

                for detail in [usb.manufacturer, usb.product, usb.serial_number]
                    .into_iter()
                    .flatten()
                {
                    kind += &format!(", {detail}");
                }

                kind
            }
            SerialPortType::BluetoothPort => "Bluetooth".into(),
            SerialPortType::PciPort => "PCI".into(),
            SerialPortType::Unknown => "Unknown".into(),
        };

        Self {
            name: info.port_name,
            kind,
        }
    }
}

impl Display for PortDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.kind)
    }
}

/// Enumerate the serial ports the OS knows about.
///
/// Enumeration problems are logged and treated as "no ports".
pub fn list_ports() -> Vec<PortDescriptor> {
    match serialport::available_ports() {
        Ok(ports) => {
            debug!(count = ports.len(), "Enumerated serial ports");
            ports.into_iter().map(PortDescriptor::from).collect()
        }
        Err(e) => {
            warn!(?e, "Could not enumerate serial ports");
            vec![]
        }
    }
}

/// How the port to open was (or should be) decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortChoice {
    /// Named by the operator up front, used as-is even if not discovered.
    Configured(String),

    /// The one and only discovered port.
    AutoSelected(String),

    /// Several candidates, the operator has to pick.
    AskOperator,

    /// Nothing configured, nothing discovered.
    NoPorts,
}

/// Decide which port to open.
pub fn choose_port(discovered: &[PortDescriptor], configured: Option<&str>) -> PortChoice {
    let choice = match (configured, discovered) {
        (Some(port), _) => PortChoice::Configured(port.to_string()),
        (None, [only]) => PortChoice::AutoSelected(only.name.clone()),
        (None, []) => PortChoice::NoPorts,
        (None, _) => PortChoice::AskOperator,
    };

    info!(?choice, "Port choice");

    choice
}

/// Let the operator pick among `discovered` by index.
/// Keeps asking until a valid index is given.
pub async fn pick_port<R, W>(
    console: &mut Console<R, W>,
    discovered: &[PortDescriptor],
) -> Result<String, Error>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if discovered.is_empty() {
        return Err(Error::NoPorts);
    }

    for (index, port) in discovered.iter().enumerate() {
        console.say(format!("[{index}] {port}")).await?;
    }

    loop {
        let Some(input) = console.prompt(PORT_PROMPT).await? else {
            warn!("Input ended before a port was picked");
            return Err(Error::Console(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before a port was picked",
            )));
        };

        let input = input.trim();

        match input.parse::<usize>().ok().and_then(|i| discovered.get(i)) {
            Some(port) => return Ok(port.name.clone()),
            None => {
                warn!(%input, "No port at this index");
                console.say("Not a valid port index").await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn acm(n: usize) -> PortDescriptor {
        PortDescriptor::new(&format!("/dev/ttyACM{n}"), "USB 1209:0001")
    }

    #[test]
    fn configured_wins_even_if_not_discovered() {
        let choice = choose_port(&[acm(0), acm(1)], Some("/dev/cu.usbmodem4072371"));

        assert_eq!(
            choice,
            PortChoice::Configured("/dev/cu.usbmodem4072371".into())
        );
    }

    #[test]
    fn single_port_is_auto_selected() {
        assert_eq!(
            choose_port(&[acm(3)], None),
            PortChoice::AutoSelected("/dev/ttyACM3".into())
        );
    }

    #[test]
    fn several_ports_ask_operator() {
        assert_eq!(choose_port(&[acm(0), acm(1)], None), PortChoice::AskOperator);
        assert_eq!(choose_port(&[], None), PortChoice::NoPorts);
    }

    #[test]
    fn usb_details_are_described() {
        let info = SerialPortInfo {
            port_name: "/dev/ttyACM0".into(),
            port_type: SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x16c0,
                pid: 0x0483,
                serial_number: Some("4072371".into()),
                manufacturer: Some("Teensyduino".into()),
                product: None,
            }),
        };

        assert_eq!(
            PortDescriptor::from(info).to_string(),
            "/dev/ttyACM0 - USB 16c0:0483, Teensyduino, 4072371"
        );
    }

    #[tokio::test]
    async fn operator_picks_after_bad_input() {
        let mut console = Console::new(&b"x\n7\n1\n"[..], Vec::new());

        let port = pick_port(&mut console, &[acm(0), acm(1)]).await.unwrap();
        assert_eq!(port, "/dev/ttyACM1");

        let shown = String::from_utf8(console.output().clone()).unwrap();
        assert_eq!(shown.matches(PORT_PROMPT).count(), 3);
        assert_eq!(shown.matches("Not a valid port index").count(), 2);
        assert!(shown.contains("[1] /dev/ttyACM1 - USB 1209:0001"));
    }

    #[tokio::test]
    async fn operator_gives_up() {
        let mut console = Console::new(&b""[..], Vec::new());

        let err = pick_port(&mut console, &[acm(0), acm(1)]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Console(ref e) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }

    #[tokio::test]
    async fn nothing_to_pick_from() {
        let mut console = Console::new(&b"0\n"[..], Vec::new());

        let err = pick_port(&mut console, &[]).await.unwrap_err();
        assert!(matches!(err, Error::NoPorts));
    }
}
