//! Structured symbol identifiers and their textual URI form
//!
//! A symbol URI looks like
//! ``scip-python python automata 0.1 `automata.core.base`/Tool#run().``:
//! a scheme, a three-part package and a path of descriptors, each terminated
//! by a suffix that encodes its kind. File-scoped symbols use the short
//! `local <id>` form. The grammar itself is handled by the `scip` crate.

use scip::symbol::{format_symbol, parse_symbol};
use scip::types::{self, descriptor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use super::error::{SymbolError, SymbolResult};

const LOCAL_SCHEME: &str = "local";

/// Kind of a descriptor, encoded in the URI by its suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuffixKind {
    /// `name/`
    Namespace,
    /// `name#`
    Type,
    /// `name.`
    Term,
    /// `name(disambiguator).`
    Method,
    /// `[name]`
    TypeParameter,
    /// `(name)`
    Parameter,
    /// `name:`
    Meta,
    /// `name!`
    Macro,
    /// `local name`
    Local,
}

impl SuffixKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Type => "type",
            Self::Term => "term",
            Self::Method => "method",
            Self::TypeParameter => "type-parameter",
            Self::Parameter => "parameter",
            Self::Meta => "meta",
            Self::Macro => "macro",
            Self::Local => "local",
        }
    }

    /// Map a SCIP suffix; the unspecified suffix has no kind
    fn from_scip(suffix: descriptor::Suffix) -> Option<Self> {
        match suffix {
            descriptor::Suffix::Namespace => Some(Self::Namespace),
            descriptor::Suffix::Type => Some(Self::Type),
            descriptor::Suffix::Term => Some(Self::Term),
            descriptor::Suffix::Method => Some(Self::Method),
            descriptor::Suffix::TypeParameter => Some(Self::TypeParameter),
            descriptor::Suffix::Parameter => Some(Self::Parameter),
            descriptor::Suffix::Meta => Some(Self::Meta),
            descriptor::Suffix::Macro => Some(Self::Macro),
            descriptor::Suffix::Local => Some(Self::Local),
            _ => None,
        }
    }

    fn to_scip(self) -> descriptor::Suffix {
        match self {
            Self::Namespace => descriptor::Suffix::Namespace,
            Self::Type => descriptor::Suffix::Type,
            Self::Term => descriptor::Suffix::Term,
            Self::Method => descriptor::Suffix::Method,
            Self::TypeParameter => descriptor::Suffix::TypeParameter,
            Self::Parameter => descriptor::Suffix::Parameter,
            Self::Meta => descriptor::Suffix::Meta,
            Self::Macro => descriptor::Suffix::Macro,
            Self::Local => descriptor::Suffix::Local,
        }
    }
}

impl fmt::Display for SuffixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One segment of a symbol's nested path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    pub name: String,
    pub kind: SuffixKind,
    /// Overload disambiguator, only meaningful for methods
    pub disambiguator: Option<String>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, kind: SuffixKind) -> Self {
        Self {
            name: name.into(),
            kind,
            disambiguator: None,
        }
    }

    /// A method descriptor; an empty disambiguator is stored as `None`
    pub fn method(name: impl Into<String>, disambiguator: impl Into<String>) -> Self {
        let disambiguator = disambiguator.into();
        Self {
            name: name.into(),
            kind: SuffixKind::Method,
            disambiguator: (!disambiguator.is_empty()).then_some(disambiguator),
        }
    }

    fn from_scip(uri: &str, raw: types::Descriptor) -> SymbolResult<Self> {
        let kind = raw
            .suffix
            .enum_value()
            .ok()
            .and_then(SuffixKind::from_scip)
            .ok_or_else(|| {
                SymbolError::malformed_uri(uri, format!("descriptor '{}' has no known suffix", raw.name))
            })?;
        if kind == SuffixKind::Method {
            return Ok(Self::method(raw.name, raw.disambiguator));
        }
        Ok(Self::new(raw.name, kind))
    }

    fn to_scip(&self) -> types::Descriptor {
        types::Descriptor {
            name: self.name.clone(),
            disambiguator: self.disambiguator.clone().unwrap_or_default(),
            suffix: self.kind.to_scip().into(),
            ..Default::default()
        }
    }
}

/// Package coordinates of a symbol; empty components are written `.`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Package {
    pub manager: String,
    pub name: String,
    pub version: String,
}

impl Package {
    pub fn new(
        manager: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            manager: manager.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    fn from_scip(raw: types::Package) -> Self {
        Self::new(
            empty_placeholder(raw.manager),
            empty_placeholder(raw.name),
            empty_placeholder(raw.version),
        )
    }

    fn to_scip(&self) -> types::Package {
        types::Package {
            manager: self.manager.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            ..Default::default()
        }
    }
}

/// Canonical structured identifier for a code entity.
///
/// Equality, ordering and hashing use the URI string only, so two symbols
/// are the same entity iff their URIs match.
#[derive(Debug, Clone)]
pub struct Symbol {
    uri: String,
    scheme: String,
    package: Package,
    descriptors: Vec<Descriptor>,
}

impl Symbol {
    /// Parse a symbol URI.
    ///
    /// The URI text is kept verbatim, so `Symbol::parse(u)?.serialize() == u`.
    pub fn parse(uri: &str) -> SymbolResult<Self> {
        if let Some(id) = uri.strip_prefix("local ") {
            if id.is_empty() || id.contains(' ') {
                return Err(SymbolError::malformed_uri(uri, "invalid local identifier"));
            }
            return Ok(Self {
                uri: uri.to_string(),
                scheme: LOCAL_SCHEME.to_string(),
                package: Package::default(),
                descriptors: vec![Descriptor::new(id, SuffixKind::Local)],
            });
        }

        let types::Symbol {
            scheme,
            package,
            descriptors,
            ..
        } = parse_symbol(uri).map_err(|e| SymbolError::malformed_uri(uri, format!("{:?}", e)))?;

        if scheme.is_empty() || scheme == LOCAL_SCHEME {
            return Err(SymbolError::malformed_uri(uri, "missing scheme"));
        }
        if descriptors.is_empty() {
            return Err(SymbolError::malformed_uri(uri, "symbol has no descriptors"));
        }
        let descriptors = descriptors
            .into_iter()
            .map(|d| Descriptor::from_scip(uri, d))
            .collect::<SymbolResult<Vec<_>>>()?;

        Ok(Self {
            uri: uri.to_string(),
            scheme,
            package: package.into_option().map(Package::from_scip).unwrap_or_default(),
            descriptors,
        })
    }

    /// Build a symbol from its parts, producing the canonical URI text
    pub fn from_parts(
        scheme: impl Into<String>,
        package: Package,
        descriptors: Vec<Descriptor>,
    ) -> Self {
        let scheme = scheme.into();
        let uri = canonical_uri(&scheme, &package, &descriptors);
        Self {
            uri,
            scheme,
            package,
            descriptors,
        }
    }

    /// Textual URI form; the exact inverse of [`Symbol::parse`]
    pub fn serialize(&self) -> String {
        self.uri.clone()
    }

    /// Borrowed URI text, as read from the index
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Indexer scheme such as `scip-python`, or `local`
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Package coordinates; all empty for local symbols
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Descriptor path from the outermost namespace inwards
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// File-scoped symbols (`local <id>`) never take part in containment
    pub fn is_local(&self) -> bool {
        self.scheme == LOCAL_SCHEME
    }

    /// Kind of the innermost descriptor
    pub fn kind(&self) -> Option<SuffixKind> {
        self.descriptors.last().map(|d| d.kind)
    }

    /// Name of the innermost descriptor
    pub fn name(&self) -> &str {
        self.descriptors
            .last()
            .map(|d| d.name.as_str())
            .unwrap_or("")
    }

    /// Dotted path of the non-namespace descriptors, e.g. `Tool.run`
    pub fn dotted_path(&self) -> String {
        self.descriptors
            .iter()
            .filter(|d| d.kind != SuffixKind::Namespace)
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// True iff `self`'s descriptor path is a strict, non-empty prefix of
    /// `other`'s and both share scheme and package.
    pub fn is_ancestor_of(&self, other: &Symbol) -> bool {
        if self.is_local() || other.is_local() {
            return false;
        }
        let mine = &self.descriptors;
        !mine.is_empty()
            && mine.len() < other.descriptors.len()
            && self.scheme == other.scheme
            && self.package == other.package
            && other.descriptors[..mine.len()] == mine[..]
    }

    /// Canonical key of the first `len` descriptors, used to look up containers
    pub(crate) fn prefix_key(&self, len: usize) -> String {
        canonical_uri(&self.scheme, &self.package, &self.descriptors[..len])
    }

    pub(crate) fn structural_key(&self) -> String {
        self.prefix_key(self.descriptors.len())
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uri.cmp(&other.uri)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.uri)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        Symbol::parse(&uri).map_err(serde::de::Error::custom)
    }
}

fn canonical_uri(scheme: &str, package: &Package, descriptors: &[Descriptor]) -> String {
    if let [d] = descriptors {
        if d.kind == SuffixKind::Local {
            return format!("{} {}", LOCAL_SCHEME, d.name);
        }
    }
    format_symbol(types::Symbol {
        scheme: scheme.to_string(),
        package: Some(package.to_scip()).into(),
        descriptors: descriptors.iter().map(Descriptor::to_scip).collect(),
        ..Default::default()
    })
}

/// The URI writes an empty package component as `.`
fn empty_placeholder(component: String) -> String {
    if component == "." {
        String::new()
    } else {
        component
    }
}
