#![deny(missing_docs)]

//! Sends command scripts to the Super Res microscope controller over a serial port,
//! and echoes whatever the controller sends back.
//!
//! The operator picks a script by its index in a [`script::ScriptTable`].
//! Its commands are written to the port one line at a time, without waiting
//! for acknowledgements. Then everything the device sends is printed until
//! the operator interrupts (or, optionally, until the device has been quiet for a while),
//! and the operator is prompted again.

/// Command scripts and the table they are picked from.
///
/// A script is an ordered list of commands which together form one
/// configuration recipe, e.g. "set up the clocks" or "start the sequencer".
/// Commands are opaque to us. The firmware parses them.
pub mod script;

/// Finding and choosing serial ports.
pub mod ports;

/// Serial port driver.
pub mod serial;

/// Prompting the operator and printing to them.
pub mod console;

/// Writing a script to a connection.
pub mod sender;

/// Printing what the device sends.
pub mod echo;

/// The interactive prompt/send/echo loop.
pub mod session;

/// Relates to config files.
pub mod config;

/// The command line interface.
pub mod cli;

/// Possible errors in this library.
pub mod error;

/// Logging/tracing setup.
pub mod logging;
