pub mod cli;
pub mod commands;
pub mod config;
pub mod graph;
pub mod index;
pub mod logging;
pub mod metrics;
pub mod rank;
pub mod search;
pub mod symbol;
pub mod tools;

pub use config::Config;
pub use graph::{SymbolContext, SymbolGraph};
pub use rank::{RankConfig, SymbolRank};
pub use search::{Query, QueryResult, SymbolSearcher};
pub use symbol::{Symbol, SymbolError, SymbolResult};
