//! Literal text search and find/replace over indexed files
//!
//! Matches are non-overlapping and found left to right, exactly as
//! `str::replace` rewrites them, so a dry-run count always equals the number
//! of substitutions a write performs on the same text.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::source::SourceProvider;
use crate::graph::SymbolGraph;
use crate::index::Occurrence;
use crate::metrics;
use crate::symbol::{Symbol, SymbolError, SymbolResult};

/// The symbol a match is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Attribution {
    Symbol(Symbol),
    /// No occurrence in the file contains the match start
    FileLevel,
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(symbol) => write!(f, "{}", symbol),
            Self::FileLevel => write!(f, "<file>"),
        }
    }
}

/// One literal match. Columns are byte offsets within the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExactMatch {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
    pub line_text: String,
    pub attribution: Attribution,
}

/// Matches keyed by file path; files without matches have no entry
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExactSearchResult {
    pub matches: BTreeMap<String, Vec<ExactMatch>>,
    /// Files that could not be read, with the reason
    pub skipped: BTreeMap<String, String>,
}

impl ExactSearchResult {
    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Regroup matches by the symbol they are attributed to
    pub fn by_symbol(&self) -> BTreeMap<&Attribution, Vec<&ExactMatch>> {
        let mut grouped: BTreeMap<&Attribution, Vec<&ExactMatch>> = BTreeMap::new();
        for m in self.matches.values().flatten() {
            grouped.entry(&m.attribution).or_default().push(m);
        }
        grouped
    }
}

/// Outcome of a replace call
#[derive(Debug, Default)]
pub struct ReplaceReport {
    /// Replacement count per file, only for files that contain `find`
    pub counts: BTreeMap<String, usize>,
    /// Files that could not be read or rewritten; the rest were still processed
    pub failures: Vec<SymbolError>,
    pub written: bool,
}

impl ReplaceReport {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Line start offsets of a text, for offset to position conversion
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn position(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&s| s <= offset) - 1;
        (line as u32, (offset - self.starts[line]) as u32)
    }

    fn line_text<'t>(&self, text: &'t str, line: u32) -> &'t str {
        let start = self.starts[line as usize];
        let end = self
            .starts
            .get(line as usize + 1)
            .map(|&next| next - 1)
            .unwrap_or(text.len());
        text[start..end].trim_end_matches('\r')
    }
}

/// Most specific non-local symbol whose occurrence span contains the start
/// of the match. Ties keep the first occurrence in file order.
fn attribute(occurrences: &[Occurrence], start: (u32, u32)) -> Attribution {
    let mut best: Option<&Symbol> = None;
    for occurrence in occurrences {
        if occurrence.symbol.is_local() {
            continue;
        }
        let span = occurrence.enclosing_range.unwrap_or(occurrence.range);
        if !span.contains(start.0, start.1) {
            continue;
        }
        let depth = occurrence.symbol.descriptors().len();
        if best.map_or(true, |b| depth > b.descriptors().len()) {
            best = Some(&occurrence.symbol);
        }
    }
    best.map_or(Attribution::FileLevel, |s| Attribution::Symbol(s.clone()))
}

/// Each indexed file path once, in index order
fn unique_paths(graph: &SymbolGraph) -> Vec<&str> {
    let mut seen = HashSet::new();
    graph
        .get_all_files()
        .iter()
        .map(|f| f.path.as_str())
        .filter(|p| seen.insert(*p))
        .collect()
}

enum FileScan {
    Matches(String, Vec<ExactMatch>),
    Unreadable(String, String),
    Cancelled,
}

/// Exact and replace search over the files of a graph
pub struct ExactSearch<'a> {
    graph: &'a SymbolGraph,
    provider: &'a dyn SourceProvider,
    max_matches_per_file: usize,
}

impl<'a> ExactSearch<'a> {
    pub fn new(graph: &'a SymbolGraph, provider: &'a dyn SourceProvider) -> Self {
        Self {
            graph,
            provider,
            max_matches_per_file: 0,
        }
    }

    /// Keep at most `limit` matches per file (0 = unlimited)
    pub fn with_max_matches_per_file(mut self, limit: usize) -> Self {
        self.max_matches_per_file = limit;
        self
    }

    pub fn search(&self, pattern: &str) -> SymbolResult<ExactSearchResult> {
        self.search_with_cancel(pattern, &CancellationToken::new())
    }

    /// Scan every indexed file for `pattern`.
    ///
    /// Files are scanned in parallel; once `cancel` fires the whole call
    /// fails with [`SymbolError::Cancelled`] and no matches are returned.
    pub fn search_with_cancel(
        &self,
        pattern: &str,
        cancel: &CancellationToken,
    ) -> SymbolResult<ExactSearchResult> {
        if pattern.is_empty() {
            return Err(SymbolError::malformed_query(pattern, "empty search pattern"));
        }

        let scans: Vec<FileScan> = unique_paths(self.graph)
            .into_par_iter()
            .map(|path| {
                if cancel.is_cancelled() {
                    return FileScan::Cancelled;
                }
                match self.provider.get_text(path) {
                    Ok(text) => FileScan::Matches(path.to_string(), self.scan(path, &text, pattern)),
                    Err(e) => FileScan::Unreadable(path.to_string(), e.to_string()),
                }
            })
            .collect();

        if cancel.is_cancelled() {
            return Err(SymbolError::Cancelled);
        }

        let mut result = ExactSearchResult::default();
        for scan in scans {
            match scan {
                FileScan::Matches(_, matches) if matches.is_empty() => {}
                FileScan::Matches(path, matches) => {
                    result.matches.insert(path, matches);
                }
                FileScan::Unreadable(path, reason) => {
                    warn!("Skipping {} during exact search: {}", path, reason);
                    result.skipped.insert(path, reason);
                }
                FileScan::Cancelled => return Err(SymbolError::Cancelled),
            }
        }

        metrics::EXACT_MATCHES.inc_by(result.total_matches() as f64);
        debug!(
            "Exact search for {:?} found {} matches in {} files",
            pattern,
            result.total_matches(),
            result.matches.len()
        );
        Ok(result)
    }

    fn scan(&self, path: &str, text: &str, pattern: &str) -> Vec<ExactMatch> {
        let lines = LineIndex::new(text);
        let occurrences = self
            .graph
            .file(path)
            .map(|f| f.occurrences.as_slice())
            .unwrap_or(&[]);

        let limit = match self.max_matches_per_file {
            0 => usize::MAX,
            n => n,
        };

        text.match_indices(pattern)
            .take(limit)
            .map(|(offset, _)| {
                let start = lines.position(offset);
                ExactMatch {
                    file_path: path.to_string(),
                    line: start.0,
                    column: start.1,
                    byte_offset: offset,
                    line_text: lines.line_text(text, start.0).to_string(),
                    attribution: attribute(occurrences, start),
                }
            })
            .collect()
    }

    /// Replace every literal `find` with `replace_with` in each indexed file.
    ///
    /// With `do_write` false nothing is touched and only counts are
    /// reported. Each rewrite is atomic; a failing file is recorded and the
    /// remaining files are still processed. The graph is not updated.
    pub fn replace(
        &self,
        find: &str,
        replace_with: &str,
        do_write: bool,
    ) -> SymbolResult<ReplaceReport> {
        if find.is_empty() {
            return Err(SymbolError::malformed_query(find, "find string is empty"));
        }

        let outcomes: Vec<(String, SymbolResult<usize>)> = unique_paths(self.graph)
            .into_par_iter()
            .map(|path| (path.to_string(), self.replace_in_file(path, find, replace_with, do_write)))
            .collect();

        let mut report = ReplaceReport {
            written: do_write,
            ..Default::default()
        };
        for (path, outcome) in outcomes {
            match outcome {
                Ok(0) => {}
                Ok(count) => {
                    report.counts.insert(path, count);
                }
                Err(e) => {
                    warn!("Replace failed for {}: {}", path, e);
                    report.failures.push(e);
                }
            }
        }

        if do_write {
            metrics::REPLACE_FILES_WRITTEN.inc_by(report.counts.len() as f64);
            info!(
                "Replaced {} occurrences of {:?} across {} files",
                report.total(),
                find,
                report.counts.len()
            );
        }
        Ok(report)
    }

    fn replace_in_file(
        &self,
        path: &str,
        find: &str,
        replace_with: &str,
        do_write: bool,
    ) -> SymbolResult<usize> {
        let text = self.provider.get_text(path)?;
        let count = text.matches(find).count();
        if count > 0 && do_write {
            self.provider.write_text(path, &text.replace(find, replace_with))?;
        }
        Ok(count)
    }
}
