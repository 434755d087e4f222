//! Index loader: reads the external JSON index into in-memory records
//!
//! The loader is a single pass over the document list. Symbol URIs that do
//! not parse are recorded as warnings and skipped, so a partially broken
//! index still yields a usable graph. Only an unreadable or structurally
//! invalid index aborts loading.

use serde::Deserialize;
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use super::model::{
    File, Occurrence, Range, Relationship, RelationshipKind, SymbolInformation, SymbolRoles,
};
use super::warnings::{LoadReport, WarningCollector, WarningStage};
use crate::symbol::{Symbol, SymbolError, SymbolResult};

/// Documents loaded from an index, plus the warnings raised on the way
#[derive(Debug, Default)]
pub struct IndexData {
    pub files: Vec<File>,
    pub report: LoadReport,
}

impl IndexData {
    pub fn occurrence_count(&self) -> usize {
        self.files.iter().map(|f| f.occurrences.len()).sum()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIndex {
    Wrapped { documents: Vec<RawDocument> },
    Bare(Vec<RawDocument>),
}

#[derive(Deserialize)]
struct RawDocument {
    relative_path: String,
    #[serde(default)]
    occurrences: Vec<RawOccurrence>,
    #[serde(default)]
    symbols: Vec<RawSymbolInformation>,
}

#[derive(Deserialize)]
struct RawOccurrence {
    #[serde(alias = "symbol")]
    symbol_uri: String,
    #[serde(default, alias = "symbol_roles")]
    roles: u32,
    start_line: Option<u32>,
    start_col: Option<u32>,
    end_line: Option<u32>,
    end_col: Option<u32>,
    range: Option<Vec<u32>>,
    #[serde(default)]
    enclosing_range: Option<Vec<u32>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocumentation {
    Text(String),
    Lines(Vec<String>),
}

#[derive(Deserialize)]
struct RawSymbolInformation {
    #[serde(alias = "symbol")]
    symbol_uri: String,
    #[serde(default)]
    documentation: Option<RawDocumentation>,
    #[serde(default)]
    relationships: Vec<RawRelationship>,
}

#[derive(Deserialize)]
struct RawRelationship {
    #[serde(alias = "symbol")]
    related_uri: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    is_reference: bool,
    #[serde(default)]
    is_implementation: bool,
    #[serde(default)]
    is_type_definition: bool,
    #[serde(default)]
    is_definition: bool,
}

impl RawRelationship {
    fn kinds(&self) -> Vec<RelationshipKind> {
        if let Some(kind) = &self.kind {
            return vec![RelationshipKind::from_name(kind)];
        }
        let mut kinds = Vec::new();
        if self.is_reference {
            kinds.push(RelationshipKind::References);
        }
        if self.is_implementation {
            kinds.push(RelationshipKind::Implements);
        }
        if self.is_type_definition {
            kinds.push(RelationshipKind::TypeDefines);
        }
        if self.is_definition {
            kinds.push(RelationshipKind::Defines);
        }
        kinds
    }
}

/// Load an index file from disk
pub fn load_index(path: &Path) -> SymbolResult<IndexData> {
    let file = fs::File::open(path).map_err(|e| {
        SymbolError::IndexLoadFailure(format!("cannot open {}: {}", path.display(), e))
    })?;
    info!("Loading index from {}", path.display());
    load_index_reader(BufReader::new(file))
}

/// Load an index from any reader producing JSON
pub fn load_index_reader<R: Read>(reader: R) -> SymbolResult<IndexData> {
    let raw: RawIndex = serde_json::from_reader(reader)
        .map_err(|e| SymbolError::IndexLoadFailure(format!("invalid index JSON: {}", e)))?;
    Ok(convert(raw))
}

/// Load an index from an in-memory JSON string
pub fn load_index_str(json: &str) -> SymbolResult<IndexData> {
    let raw: RawIndex = serde_json::from_str(json)
        .map_err(|e| SymbolError::IndexLoadFailure(format!("invalid index JSON: {}", e)))?;
    Ok(convert(raw))
}

fn convert(raw: RawIndex) -> IndexData {
    let documents = match raw {
        RawIndex::Wrapped { documents } => documents,
        RawIndex::Bare(documents) => documents,
    };

    let mut warnings = WarningCollector::new();
    let files: Vec<File> = documents
        .into_iter()
        .map(|doc| convert_document(doc, &mut warnings))
        .collect();

    let data = IndexData {
        files,
        report: warnings.into_report(),
    };
    info!(
        "Loaded {} files with {} occurrences ({} warnings)",
        data.files.len(),
        data.occurrence_count(),
        data.report.warnings.len()
    );
    data
}

fn convert_document(doc: RawDocument, warnings: &mut WarningCollector) -> File {
    let path = doc.relative_path;
    let mut occurrences = Vec::with_capacity(doc.occurrences.len());

    for raw in doc.occurrences {
        let symbol = match Symbol::parse(&raw.symbol_uri) {
            Ok(symbol) => symbol,
            Err(e) => {
                warnings.record(&path, e, WarningStage::SymbolParse);
                continue;
            }
        };
        let Some(range) = occurrence_range(&raw) else {
            warnings.record(
                &path,
                format!("occurrence of {} has no valid range", raw.symbol_uri),
                WarningStage::Occurrence,
            );
            continue;
        };
        let enclosing_range = match raw.enclosing_range.as_deref() {
            None | Some([]) => None,
            Some(values) => {
                let parsed = range_from_array(values);
                if parsed.is_none() {
                    warnings.record(
                        &path,
                        format!("ignoring invalid enclosing range for {}", raw.symbol_uri),
                        WarningStage::Occurrence,
                    );
                }
                parsed
            }
        };
        occurrences.push(Occurrence {
            symbol,
            file_path: path.clone(),
            range,
            enclosing_range,
            roles: SymbolRoles::from_bits(raw.roles),
        });
    }

    let mut symbols = Vec::with_capacity(doc.symbols.len());
    for raw in doc.symbols {
        let symbol = match Symbol::parse(&raw.symbol_uri) {
            Ok(symbol) => symbol,
            Err(e) => {
                warnings.record(&path, e, WarningStage::SymbolParse);
                continue;
            }
        };

        let mut relationships = Vec::new();
        for rel in &raw.relationships {
            let related = match Symbol::parse(&rel.related_uri) {
                Ok(related) => related,
                Err(e) => {
                    warnings.record(&path, e, WarningStage::Relationship);
                    continue;
                }
            };
            let kinds = rel.kinds();
            if kinds.is_empty() {
                warnings.record(
                    &path,
                    format!("relationship to {} has no kind", rel.related_uri),
                    WarningStage::Relationship,
                );
            }
            for kind in kinds {
                relationships.push(Relationship {
                    symbol: related.clone(),
                    kind,
                });
            }
        }

        let documentation = raw.documentation.and_then(|doc| {
            let text = match doc {
                RawDocumentation::Text(text) => text,
                RawDocumentation::Lines(lines) => lines.join("\n\n"),
            };
            (!text.trim().is_empty()).then_some(text)
        });

        symbols.push(SymbolInformation {
            symbol,
            documentation,
            relationships,
        });
    }

    debug!(
        "Loaded document {} ({} occurrences, {} symbols)",
        path,
        occurrences.len(),
        symbols.len()
    );

    File {
        path,
        occurrences,
        symbols,
    }
}

fn occurrence_range(raw: &RawOccurrence) -> Option<Range> {
    match (raw.start_line, raw.start_col, raw.end_line, raw.end_col) {
        (Some(sl), Some(sc), Some(el), Some(ec)) => valid(Range::new(sl, sc, el, ec)),
        _ => raw.range.as_deref().and_then(range_from_array),
    }
}

/// Convert the compact `[line, start, end]` / `[sl, sc, el, ec]` form
fn range_from_array(values: &[u32]) -> Option<Range> {
    match *values {
        [line, start, end] => valid(Range::new(line, start, line, end)),
        [sl, sc, el, ec] => valid(Range::new(sl, sc, el, ec)),
        _ => None,
    }
}

fn valid(range: Range) -> Option<Range> {
    ((range.end_line, range.end_col) >= (range.start_line, range.start_col)).then_some(range)
}
