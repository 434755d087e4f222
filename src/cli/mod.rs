use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "symbolgraph")]
#[command(author, version, about = "Query a precomputed symbol index of a codebase")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the JSON symbol index
    #[arg(short, long)]
    pub index: PathBuf,

    /// Project root that indexed paths are relative to (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List indexed files in index order
    Files,

    /// List symbols defined under a dotted module path
    Symbols {
        /// Module path such as `pkg.module`
        module_path: String,
    },

    /// Show the context of a symbol
    Context {
        /// Full symbol URI
        uri: String,
    },

    /// Run a typed query, e.g. `type:exact "foo"`
    Query {
        /// Query text; multiple words are joined with spaces
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Rank symbols by importance, optionally focused on a query
    Rank {
        /// Substring matched against symbol URIs and documentation
        query: Option<String>,

        /// Maximum number of symbols to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show graph statistics and metrics
    Stats {
        /// Output in Prometheus format
        #[arg(long)]
        prometheus: bool,
    },
}
