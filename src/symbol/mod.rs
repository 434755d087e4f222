//! Symbol identifiers and engine errors
//!
//! Every other module speaks in terms of [`Symbol`]: the loader parses URIs
//! into it, the graph keys its relations by it, and the searcher hands it
//! back to callers.

pub mod error;
pub mod uri;

pub use error::{SymbolError, SymbolResult};
pub use uri::{Descriptor, Package, SuffixKind, Symbol};
