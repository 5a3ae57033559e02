use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

/// A single device instruction, in the firmware's comma separated grammar.
///
/// Stored without a line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    /// Borrowed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: AsRef<str>> From<T> for Command {
    fn from(string_like: T) -> Self {
        Self(string_like.as_ref().into())
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered list of commands. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// E.g. `script_1`.
    pub name: String,

    /// Free text shown when listing scripts.
    #[serde(default)]
    pub description: Option<String>,

    /// The commands, in the order they are sent.
    pub commands: Vec<Command>,
}

impl Script {
    /// Make a script from string-likes.
    pub fn new<S: AsRef<str>>(name: &str, description: Option<&str>, commands: &[S]) -> Self {
        Self {
            name: name.into(),
            description: description.map(Into::into),
            commands: commands.iter().map(Command::from).collect(),
        }
    }
}

// Note: `script_0` and `script_4` each contain one line where two commands
// were joined without a separator. The device receives them as a single
// malformed command. This is the data the controller has been driven with,
// so it is kept verbatim. `concat!` makes the join visible.
type BuiltinScript = (&'static str, &'static str, &'static [&'static str]);

const BUILTIN: &[BuiltinScript] = &[
    (
        "script_0",
        "Full setup: clocks, trigger processor, sequencer chain, start",
        &[
            "STOP_SEQ",
            "0,off,SET_STATE_CLK",
            "0,1000,SET_PERIOD_CLK",
            "1,rise,3,2,3,SET_PRC",
            "CLEAR_SQ",
            concat!("clk,0,trg,0,prc,1,las,3,out,2,SET_CHAIN_SEQ", "on, SET_STATE_CLK"),
            "START_SEQ",
        ],
    ),
    (
        "script_1",
        "Configure triggering modes and clocks",
        &[
            "STOP_SEQ",
            "0,off,SET_STATE_CLK",
            "0,1000,SET_PERIOD_CLK",
            "1,rise,3,2,3,SET_PRC",
        ],
    ),
    (
        "script_2",
        "Configure the sequencer chain",
        &["CLEAR_SQ", "clk,0,trg,0,prc,1,las,3,out,2,SET_CHAIN_SEQ"],
    ),
    (
        "script_3",
        "Start the sequencer from clock activation",
        &["on, SET_STATE_CLK", "START_SEQ"],
    ),
    (
        "script_4",
        "Clock straight to laser, status, start",
        &[
            "STOP_SEQ",
            "0,off,SET_STATE_CLK",
            "0,1000,SET_PERIOD_CLK",
            "CLEAR_SQ",
            concat!("clk,0,las,0,SET_CHAIN_SEQ", "STATUS_SEQ"),
            "START_SEQ",
            "on, SET_STATE_CLK",
        ],
    ),
    (
        "script_5",
        "Clock 0 period, then on",
        &["0,off,SET_STATE_CLK", "0,1000,SET_PERIOD_CLK", "0,1,SET_STATE_CLK"],
    ),
];

/// The scripts offered to the operator, indexed by position.
///
/// Built once at startup, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTable(Vec<Script>);

impl ScriptTable {
    /// Wrap the given scripts, in order.
    pub fn new(scripts: Vec<Script>) -> Self {
        Self(scripts)
    }

    /// The scripts the controller is usually driven with.
    pub fn builtin() -> Self {
        Self(
            BUILTIN
                .iter()
                .map(|&(name, description, commands)| {
                    Script::new(name, Some(description), commands)
                })
                .collect(),
        )
    }

    /// Number of scripts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no scripts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The script at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Script> {
        self.0.get(index)
    }

    /// All scripts, in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Script> {
        self.0.iter()
    }

    /// Resolve operator input to a script.
    ///
    /// Non-numeric input and indices outside the table are both [`Error::InvalidIndex`].
    pub fn select(&self, input: &str) -> Result<(usize, &Script), Error> {
        let trimmed = input.trim();

        let script = trimmed
            .parse::<usize>()
            .ok()
            .and_then(|index| self.get(index).map(|script| (index, script)));

        script.ok_or_else(|| {
            warn!(input = %trimmed, scripts = self.len(), "No script at this index");
            Error::InvalidIndex(trimmed.to_string())
        })
    }
}

impl Default for ScriptTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Display for ScriptTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, script) in self.iter().enumerate() {
            write!(f, "[{index}] {}", script.name)?;
            if let Some(description) = &script.description {
                write!(f, ": {description}")?;
            }
            writeln!(f)?;

            for command in &script.commands {
                writeln!(f, "      {command}")?;
            }
        }

        Ok(())
    }
}
