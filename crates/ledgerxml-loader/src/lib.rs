//! Ledger XML loader.
//!
//! This crate wires byte sources to the streaming parser and returns a
//! fully built [`Ledger`]. Sources are:
//!
//! - in-memory buffers ([`load_from_bytes`])
//! - any buffered reader ([`load_from_reader`]) or file ([`load_from_file`])
//! - asynchronous readers ([`load_from_async_reader`])
//! - the `ledger xml` command run on a journal file ([`load_from_process`],
//!   [`load_from_process_async`])
//!
//! Every load is a single operation that either returns a complete ledger
//! or fails; no partial ledger is ever returned.
//!
//! # Example
//!
//! ```ignore
//! use ledgerxml_loader::{load_from_process, ProcessConfig};
//! use std::path::Path;
//!
//! let ledger = load_from_process(Path::new("journal.ledger"), &ProcessConfig::default())?;
//! println!("{} transactions", ledger.transactions().len());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod process;

pub use process::{load_from_process, load_from_process_async, ProcessConfig};

use ledgerxml_core::Ledger;
use ledgerxml_parser::{build_ledger, parse_document, parse_document_async};
pub use ledgerxml_parser::{BuildError, ParseError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;
use tokio::io::AsyncBufRead;
use tracing::debug;

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error opening a file.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The input is not a well-formed ledger XML document.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The document does not describe a consistent ledger.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The external ledger command could not be started.
    #[error("failed to run {}: {source}", .program.display())]
    Spawn {
        /// The program that failed to start.
        program: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The external ledger command exited unsuccessfully.
    #[error("{} exited with {status}: {stderr}", .program.display())]
    Process {
        /// The program that failed.
        program: PathBuf,
        /// Its exit status.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Load a ledger from an in-memory XML buffer.
pub fn load_from_bytes(bytes: &[u8]) -> Result<Ledger, LoadError> {
    load_from_reader(bytes)
}

/// Load a ledger from a buffered reader.
pub fn load_from_reader<R: BufRead>(input: R) -> Result<Ledger, LoadError> {
    let tree = parse_document(input)?;
    Ok(build_ledger(&tree)?)
}

/// Load a ledger from an XML file.
pub fn load_from_file(path: &Path) -> Result<Ledger, LoadError> {
    debug!(path = %path.display(), "loading ledger XML");
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_reader(BufReader::new(file))
}

/// Load a ledger from an asynchronous reader.
pub async fn load_from_async_reader<R: AsyncBufRead + Unpin>(
    input: R,
) -> Result<Ledger, LoadError> {
    let tree = parse_document_async(input).await?;
    Ok(build_ledger(&tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"<ledger version="1">
        <commodities><commodity flags=""><symbol>USD</symbol></commodity></commodities>
        <accounts><account id="a"><name>Cash</name><fullname>Assets:Cash</fullname></account></accounts>
        <transactions>
          <transaction><date>2024/05/01</date><payee>ATM</payee><postings>
            <posting><account ref="a"/><post-amount><amount>
              <commodity><symbol>USD</symbol></commodity><quantity>20</quantity>
            </amount></post-amount></posting>
          </postings></transaction>
        </transactions>
      </ledger>"#;

    #[test]
    fn test_load_from_bytes() {
        let ledger = load_from_bytes(MINIMAL.as_bytes()).unwrap();
        assert_eq!(ledger.accounts.len(), 1);
        assert_eq!(ledger.transactions().get(0).unwrap().payee, "ATM");
    }

    #[test]
    fn test_parse_errors_pass_through() {
        let err = load_from_bytes(b"<ledger version=\"1\">").unwrap_err();
        assert!(matches!(err, LoadError::Parse(ParseError::UnexpectedEof)));
    }

    #[test]
    fn test_build_errors_pass_through() {
        let broken = MINIMAL.replace("ref=\"a\"", "ref=\"zz\"");
        let err = load_from_bytes(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Build(BuildError::UnknownAccount { .. })));
    }

    #[test]
    fn test_missing_file() {
        let err = load_from_file(Path::new("/nonexistent/ledger.xml")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_from_async_reader() {
        let ledger = load_from_async_reader(MINIMAL.as_bytes()).await.unwrap();
        assert_eq!(ledger.transactions().len(), 1);
    }
}
