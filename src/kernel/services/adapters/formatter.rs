//! `:fmt` support: pipes the buffer through the language's formatter.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::kernel::language::{FormatterConfig, Languages};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("no formatter for {0}")]
    NoFormatter(String),
    #[error("cannot run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Formats `text` with the formatter configured for `language`.
pub fn format_for_language(
    languages: &Languages,
    language: &str,
    text: &str,
) -> Result<String, FormatError> {
    let formatter = languages
        .by_name(language)
        .and_then(|l| l.formatter.as_ref())
        .ok_or_else(|| FormatError::NoFormatter(language.to_string()))?;
    run_formatter(formatter, text)
}

/// Feeds `text` on stdin and returns stdout. A non-zero exit yields the
/// first line of stderr.
pub fn run_formatter(formatter: &FormatterConfig, text: &str) -> Result<String, FormatError> {
    let mut child = Command::new(&formatter.command)
        .args(&formatter.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| FormatError::Spawn {
            command: formatter.command.clone(),
            source,
        })?;

    // stdin is fed from its own thread; the formatter may fill stdout first.
    let writer = child.stdin.take().map(|mut stdin| {
        let input = text.to_string();
        std::thread::spawn(move || stdin.write_all(input.as_bytes()))
    });

    let output = child.wait_with_output()?;
    let fed = match writer.map(|w| w.join()) {
        Some(Ok(result)) => result,
        Some(Err(_)) => return Err(FormatError::Failed("formatter input thread panicked".into())),
        None => Ok(()),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let first = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
        let message = if first.is_empty() {
            format!("{} exited with {}", formatter.command, output.status)
        } else {
            first.to_string()
        };
        tracing::warn!(command = %formatter.command, error = %message, "formatter failed");
        return Err(FormatError::Failed(message));
    }
    fed?;

    tracing::debug!(command = %formatter.command, bytes = output.stdout.len(), "formatted");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/formatter.rs"]
mod tests;
