//! Console commands read from stdin while a session runs.

use crate::error::{CliError, Result};

/// One parsed console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Zero the shake count
    Reset,
    /// Change the sampling frequency
    Frequency(u32),
    /// End the session
    Quit,
    /// Blank line
    Empty,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(Self::Empty);
        };

        let parsed = match command.to_ascii_lowercase().as_str() {
            "reset" | "r" => Self::Reset,
            "quit" | "q" | "exit" => Self::Quit,
            "freq" | "f" => {
                let value = parts
                    .next()
                    .ok_or_else(|| CliError::invalid_argument("freq", "missing frequency"))?;
                let hz = value
                    .parse::<u32>()
                    .map_err(|e| CliError::invalid_argument("freq", e.to_string()))?;
                Self::Frequency(hz)
            }
            _ => return Err(CliError::unknown_command(line.trim())),
        };

        if parts.next().is_some() {
            return Err(CliError::invalid_argument(command, "too many arguments"));
        }
        Ok(parsed)
    }
}
