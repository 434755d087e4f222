//! Query processing over a loaded symbol graph.
//!
//! This module contains:
//! - `query` - The typed query mini-language
//! - `source` - Source text access and atomic file rewrites
//! - `exact` - Literal search with symbol attribution, and find/replace
//! - `searcher` - The `SymbolSearcher` dispatcher used by callers

pub mod exact;
pub mod query;
pub mod searcher;
pub mod source;

pub use exact::{Attribution, ExactMatch, ExactSearch, ExactSearchResult, ReplaceReport};
pub use query::Query;
pub use searcher::{QueryResult, RankedSymbol, SymbolSearcher};
pub use source::{extract_definition, FsSourceProvider, SourceProvider};
