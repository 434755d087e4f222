//! In-memory records produced by the index loader
//!
//! These are created once during loading and never mutated afterwards.
//! Lines and columns are zero-based, exactly as the indexer wrote them.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::symbol::Symbol;

/// Location of an occurrence within its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Range {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Range {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Whether the position lies inside the range (end column exclusive)
    pub fn contains(&self, line: u32, col: u32) -> bool {
        (line, col) >= (self.start_line, self.start_col) && (line, col) < (self.end_line, self.end_col)
    }

    pub fn start(&self) -> (u32, u32) {
        (self.start_line, self.start_col)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

/// Role bitset of an occurrence, using the indexer's bit values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SymbolRoles(u32);

impl SymbolRoles {
    pub const DEFINITION: u32 = 0x1;
    pub const IMPORT: u32 = 0x2;
    pub const WRITE: u32 = 0x4;
    pub const READ: u32 = 0x8;

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn is_definition(&self) -> bool {
        self.contains(Self::DEFINITION)
    }

    /// Any occurrence that is not a definition counts as a reference
    pub fn is_reference(&self) -> bool {
        !self.is_definition()
    }

    pub fn is_import(&self) -> bool {
        self.contains(Self::IMPORT)
    }
}

impl fmt::Display for SymbolRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.is_definition() {
            names.push("definition");
        } else {
            names.push("reference");
        }
        if self.is_import() {
            names.push("import");
        }
        if self.contains(Self::WRITE) {
            names.push("write");
        }
        if self.contains(Self::READ) {
            names.push("read");
        }
        write!(f, "{}", names.join("|"))
    }
}

/// A located mention of a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub symbol: Symbol,
    pub file_path: String,
    pub range: Range,
    /// Span of the whole syntactic construct, when the indexer provides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing_range: Option<Range>,
    pub roles: SymbolRoles,
}

impl Occurrence {
    pub fn is_definition(&self) -> bool {
        self.roles.is_definition()
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file_path, self.range, self.roles)
    }
}

/// How two symbols are related, as declared by the indexer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RelationshipKind {
    References,
    Implements,
    TypeDefines,
    Defines,
    Other(String),
}

impl RelationshipKind {
    /// Parse a relationship kind name, accepting the common spellings
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "references" | "reference" => Self::References,
            "implements" | "implementation" => Self::Implements,
            "typedefines" | "typedefinition" => Self::TypeDefines,
            "defines" | "definition" => Self::Defines,
            _ => Self::Other(name.to_string()),
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::References => write!(f, "references"),
            Self::Implements => write!(f, "implements"),
            Self::TypeDefines => write!(f, "type-defines"),
            Self::Defines => write!(f, "defines"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub symbol: Symbol,
    pub kind: RelationshipKind,
}

/// Metadata the indexer supplies for a symbol defined in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolInformation {
    pub symbol: Symbol,
    pub documentation: Option<String>,
    pub relationships: Vec<Relationship>,
}

/// One indexed source file
#[derive(Debug, Clone, Serialize)]
pub struct File {
    pub path: String,
    pub occurrences: Vec<Occurrence>,
    pub symbols: Vec<SymbolInformation>,
}

impl File {
    /// Dotted module path of the file, e.g. `a/b.py` -> `a.b`
    pub fn module_path(&self) -> String {
        module_path_for(&self.path)
    }
}

/// Derive the dotted module path the indexer uses for a relative file path.
///
/// The extension is stripped, directory separators become dots and a
/// trailing package initializer (`__init__`) is dropped.
pub fn module_path_for(path: &str) -> String {
    let trimmed = path.trim_start_matches("./");
    let stem = Path::new(trimmed).with_extension("");
    let dotted = stem.to_string_lossy().replace(['/', '\\'], ".");
    if dotted == "__init__" {
        return String::new();
    }
    match dotted.strip_suffix(".__init__") {
        Some(package) => package.to_string(),
        None => dotted,
    }
}

/// Check whether `module` equals `prefix` or is nested below it
pub fn module_is_under(module: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    module == prefix
        || module
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}
