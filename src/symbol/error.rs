//! Typed errors returned by the symbol graph engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading an index or answering queries against it.
///
/// Query-time variants are reported back to the caller; only
/// [`SymbolError::IndexLoadFailure`] aborts graph construction.
#[derive(Debug, Error)]
pub enum SymbolError {
    /// The symbol URI does not follow the indexer's grammar
    #[error("malformed symbol URI '{uri}': {reason}")]
    MalformedSymbolUri { uri: String, reason: String },

    /// The symbol has no definition and no references in the graph
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// The query tag is not one of the supported query types
    #[error("unsupported query type '{0}'")]
    UnsupportedQueryType(String),

    /// The query tag is known but its arguments are missing or invalid
    #[error("malformed query '{query}': {reason}")]
    MalformedQuery { query: String, reason: String },

    /// A symbol is defined more than once; the first definition is kept
    #[error("duplicate definition of {symbol} in {path} (first defined in {first_path})")]
    DuplicateDefinition {
        symbol: String,
        path: String,
        first_path: String,
    },

    /// The index could not be read or is structurally corrupt
    #[error("failed to load index: {0}")]
    IndexLoadFailure(String),

    /// Atomic rewrite of a file failed during replace
    #[error("failed to write {}: {reason}", path.display())]
    FileWriteFailure { path: PathBuf, reason: String },

    /// Reading source text from the provider failed
    #[error("failed to read source for {path}: {reason}")]
    Source { path: String, reason: String },

    /// The call observed a cancellation signal and discarded its partial results
    #[error("operation cancelled")]
    Cancelled,
}

impl SymbolError {
    pub(crate) fn malformed_uri(uri: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSymbolUri {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_query(query: &str, reason: impl Into<String>) -> Self {
        Self::MalformedQuery {
            query: query.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the engine
pub type SymbolResult<T> = std::result::Result<T, SymbolError>;
