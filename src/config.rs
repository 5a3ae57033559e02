use std::{path::Path, time::Duration};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    script::{Script, ScriptTable},
    serial::connection::DEFAULT_BAUD,
};

/// The configuration used for a session.
///
/// Every field may be omitted from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The port to open.
    /// If not set, the port is discovered, see [`crate::ports::choose_port`].
    pub port: Option<String>,

    /// Baud rate of the link.
    pub baud: u32,

    /// Return to the prompt when the device has been quiet for this long.
    /// If not set, echoing continues until interrupted.
    pub echo_idle_timeout_ms: Option<u64>,

    /// Replaces the built-in scripts if set.
    pub scripts: Option<Vec<Script>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
            echo_idle_timeout_ms: None,
            scripts: None,
        }
    }
}

impl Config {
    fn ron() -> ron::Options {
        ron::Options::default()
            .with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
            .with_default_extension(ron::extensions::Extensions::UNWRAP_NEWTYPES)
    }

    /// Deserialize and validate a .ron file's contents.
    pub fn deserialize(input: &str) -> Result<Self, Error> {
        let config = Self::ron()
            .from_str::<Config>(input)
            .map_err(|e| Error::BadConfig(format!("Not valid RON: {e}")))?;

        config.validate()?;

        Ok(config)
    }

    /// An example configuration with all fields filled in.
    pub fn example() -> Self {
        Self {
            port: Some("/dev/cu.usbmodem4072371".into()),
            baud: DEFAULT_BAUD,
            echo_idle_timeout_ms: Some(2000),
            scripts: Some(vec![
                Script::new(
                    "clocks",
                    Some("Configure triggering modes and clocks"),
                    &[
                        "STOP_SEQ",
                        "0,off,SET_STATE_CLK",
                        "0,1000,SET_PERIOD_CLK",
                        "1,rise,3,2,3,SET_PRC",
                    ],
                ),
                Script::new("start", None, &["on, SET_STATE_CLK", "START_SEQ"]),
            ]),
        }
    }

    /// Serialize the configuration in a "pretty" (i.e. non-compact) fashion.
    pub fn serialize_pretty(&self) -> Result<String, Error> {
        Self::ron()
            .to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::BadConfig(format!("Could not serialize: {e}")))
    }

    /// Setup a new configuration from a RON file.
    pub fn new_from_path<P: AsRef<Path>>(p: P) -> Result<Self, Error> {
        let p = p.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::BadConfig(format!("Could not read {p:?}: {e}")))?;

        Self::deserialize(&s)
    }

    /// The scripts to offer: from the configuration if given, else the built-in ones.
    pub fn script_table(&self) -> ScriptTable {
        match &self.scripts {
            Some(scripts) => ScriptTable::new(scripts.clone()),
            None => ScriptTable::builtin(),
        }
    }

    /// See [`Config::echo_idle_timeout_ms`].
    pub fn echo_idle_timeout(&self) -> Option<Duration> {
        self.echo_idle_timeout_ms.map(Duration::from_millis)
    }

    fn check_link(&self) -> Result<(), Error> {
        if self.baud == 0 {
            return Err(Error::BadConfig("The baud rate must be non-zero".into()));
        }

        if self.echo_idle_timeout_ms == Some(0) {
            return Err(Error::BadConfig(
                "An echo idle timeout of zero would never show anything. Leave it out to echo until interrupted.".into(),
            ));
        }

        if matches!(&self.port, Some(port) if port.trim().is_empty()) {
            return Err(Error::BadConfig("The port name is empty".into()));
        }

        Ok(())
    }

    fn check_scripts(&self) -> Result<(), Error> {
        // Not giving scripts is ok, the built-in ones are used then.
        let Some(scripts) = &self.scripts else {
            return Ok(());
        };

        if scripts.is_empty() {
            return Err(Error::BadConfig(
                "If scripts are given there must be at least one. Leave it out to use the built-in scripts.".into(),
            ));
        }

        for (index, script) in scripts.iter().enumerate() {
            if script.commands.is_empty() {
                return Err(Error::BadConfig(format!(
                    "The script `{}` with index {index} (zero indexed) has no commands.",
                    script.name
                )));
            }
        }

        let duplicates = scripts
            .iter()
            .map(|script| &script.name)
            .duplicates()
            .collect::<Vec<_>>();

        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(Error::BadConfig(format!(
                "Script names must be unique. Duplicates: {duplicates:?}"
            )))
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        self.check_link()?;
        self.check_scripts()?;

        Ok(())
    }
}
