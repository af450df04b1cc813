//! Loading through the external `ledger` command.
//!
//! Runs `ledger xml -f <journal> --sort <expr>` and parses its standard
//! output while the command is still writing it.

use ledgerxml_core::Ledger;
use ledgerxml_parser::{build_ledger, parse_document, parse_document_async, ParseError, XmlNode};
use std::ffi::OsString;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::LoadError;

/// How to invoke the external ledger command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Program to run.
    pub program: PathBuf,
    /// Sort expression passed as `--sort`, if any.
    pub sort: Option<String>,
    /// Additional arguments appended after the standard ones.
    pub extra_args: Vec<String>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ledger"),
            sort: Some("date".to_string()),
            extra_args: Vec::new(),
        }
    }
}

impl ProcessConfig {
    /// Use a different program.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set or clear the sort expression.
    #[must_use]
    pub fn with_sort(mut self, sort: Option<String>) -> Self {
        self.sort = sort;
        self
    }

    /// Append an extra argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Arguments passed to the program for `journal`.
    #[must_use]
    pub fn args(&self, journal: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["xml".into(), "-f".into(), journal.into()];
        if let Some(sort) = &self.sort {
            args.push("--sort".into());
            args.push(sort.into());
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }
}

/// Load a ledger by running the ledger command on `journal`.
pub fn load_from_process(journal: &Path, config: &ProcessConfig) -> Result<Ledger, LoadError> {
    info!(program = %config.program.display(), journal = %journal.display(), "running ledger");

    let mut child = Command::new(&config.program)
        .args(config.args(journal))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| spawn_error(config, source))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_error(config, io::Error::other("stdout not captured")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| spawn_error(config, io::Error::other("stderr not captured")))?;

    // Drain stderr concurrently so a chatty child cannot block on a full pipe.
    let stderr_reader = std::thread::spawn(move || {
        let mut text = String::new();
        if let Err(err) = stderr.read_to_string(&mut text) {
            debug!(%err, "failed to read ledger stderr");
        }
        text
    });

    let mut stdout = BufReader::new(stdout);
    let parsed = parse_document(&mut stdout);
    // Consume anything after </ledger> so the child never sees a closed pipe.
    if let Err(err) = io::copy(&mut stdout, &mut io::sink()) {
        debug!(%err, "failed to drain ledger stdout");
    }
    let status = child
        .wait()
        .map_err(|source| spawn_error(config, source))?;
    let stderr = stderr_reader.join().unwrap_or_default();

    finish(config, parsed, status, &stderr)
}

/// Asynchronous variant of [`load_from_process`].
pub async fn load_from_process_async(
    journal: &Path,
    config: &ProcessConfig,
) -> Result<Ledger, LoadError> {
    info!(program = %config.program.display(), journal = %journal.display(), "running ledger");

    let mut child = tokio::process::Command::new(&config.program)
        .args(config.args(journal))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| spawn_error(config, source))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_error(config, io::Error::other("stdout not captured")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| spawn_error(config, io::Error::other("stderr not captured")))?;

    let mut stdout = tokio::io::BufReader::new(stdout);
    let mut stderr_text = String::new();
    let (parsed, stderr_read) = tokio::join!(
        async {
            let parsed = parse_document_async(&mut stdout).await;
            if let Err(err) = tokio::io::copy(&mut stdout, &mut tokio::io::sink()).await {
                debug!(%err, "failed to drain ledger stdout");
            }
            parsed
        },
        stderr.read_to_string(&mut stderr_text),
    );
    if let Err(err) = stderr_read {
        debug!(%err, "failed to read ledger stderr");
    }
    let status = child
        .wait()
        .await
        .map_err(|source| spawn_error(config, source))?;

    finish(config, parsed, status, &stderr_text)
}

fn spawn_error(config: &ProcessConfig, source: io::Error) -> LoadError {
    LoadError::Spawn {
        program: config.program.clone(),
        source,
    }
}

/// A failing exit status takes precedence over parse errors: a command
/// that failed usually wrote nothing useful to stdout.
fn finish(
    config: &ProcessConfig,
    parsed: Result<XmlNode, ParseError>,
    status: ExitStatus,
    stderr: &str,
) -> Result<Ledger, LoadError> {
    debug!(%status, "ledger exited");
    if !status.success() {
        return Err(LoadError::Process {
            program: config.program.clone(),
            status,
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(build_ledger(&parsed?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = ProcessConfig::default().args(Path::new("book.ledger"));
        assert_eq!(args, vec!["xml", "-f", "book.ledger", "--sort", "date"]);
    }

    #[test]
    fn test_custom_args() {
        let config = ProcessConfig::default()
            .with_program("/opt/bin/ledger")
            .with_sort(None)
            .with_arg("--real");
        assert_eq!(config.program, PathBuf::from("/opt/bin/ledger"));
        assert_eq!(
            config.args(Path::new("book.ledger")),
            vec!["xml", "-f", "book.ledger", "--real"]
        );
    }

    #[test]
    fn test_missing_program() {
        let config = ProcessConfig::default().with_program("/nonexistent/ledger-binary");
        let err = load_from_process(Path::new("book.ledger"), &config).unwrap_err();
        assert!(matches!(err, LoadError::Spawn { .. }));
    }
}
