//! Access to the raw source text behind an index

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

use crate::graph::DefinitionSite;
use crate::symbol::{Symbol, SymbolError, SymbolResult};

/// Reads and rewrites the files an index refers to.
///
/// Paths are the index's relative file paths.
pub trait SourceProvider: Send + Sync {
    fn get_text(&self, file_path: &str) -> SymbolResult<String>;

    /// Replace the whole contents of a file. Readers must observe either
    /// the old or the new contents, never a partial write.
    fn write_text(&self, file_path: &str, contents: &str) -> SymbolResult<()>;

    /// Source text at a symbol's definition site
    fn get_definition_text(&self, _symbol: &Symbol, site: &DefinitionSite) -> SymbolResult<String> {
        let text = self.get_text(&site.file_path)?;
        extract_definition(&text, site)
    }
}

/// Cut a definition out of a file's text.
///
/// With an enclosing range the covered lines are returned; otherwise the
/// definition line and the indented block that follows it.
pub fn extract_definition(text: &str, site: &DefinitionSite) -> SymbolResult<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = site.range.start_line as usize;
    if start >= lines.len() {
        return Err(SymbolError::Source {
            path: site.file_path.clone(),
            reason: format!(
                "definition line {} is beyond the end of the file ({} lines)",
                start,
                lines.len()
            ),
        });
    }

    let (first, end) = match site.enclosing_range {
        Some(range) => {
            let first = (range.start_line as usize).min(start);
            let mut end = (range.end_line as usize).min(lines.len() - 1);
            // An end at column 0 stops before that line
            if range.end_col == 0 && end > first {
                end -= 1;
            }
            (first, end.max(first))
        }
        None => (start, indented_block_end(&lines, start)),
    };

    Ok(lines[first..=end].join("\n"))
}

/// Index of the last line of the block opened at `start`
fn indented_block_end(lines: &[&str], start: usize) -> usize {
    let base = indentation(lines[start]);
    let mut end = start;
    for (i, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim().is_empty() {
            continue;
        }
        if indentation(line) <= base {
            break;
        }
        end = i;
    }
    end
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Source provider over a directory on disk
#[derive(Debug, Clone)]
pub struct FsSourceProvider {
    root: PathBuf,
}

impl FsSourceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an index path under the root, refusing paths that escape it
    fn resolve(&self, file_path: &str) -> SymbolResult<PathBuf> {
        let relative = Path::new(file_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SymbolError::Source {
                path: file_path.to_string(),
                reason: "path is not relative to the source root".to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl SourceProvider for FsSourceProvider {
    fn get_text(&self, file_path: &str) -> SymbolResult<String> {
        let path = self.resolve(file_path)?;
        fs::read_to_string(&path).map_err(|e| SymbolError::Source {
            path: file_path.to_string(),
            reason: e.to_string(),
        })
    }

    fn write_text(&self, file_path: &str, contents: &str) -> SymbolResult<()> {
        let path = self.resolve(file_path)?;
        let write_failure = |reason: String| SymbolError::FileWriteFailure {
            path: path.clone(),
            reason,
        };

        let parent = path.parent().unwrap_or(&self.root);
        let mut temp = NamedTempFile::new_in(parent).map_err(|e| write_failure(e.to_string()))?;
        temp.write_all(contents.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| write_failure(e.to_string()))?;

        if let Ok(metadata) = fs::metadata(&path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| write_failure(e.to_string()))?;
        }

        temp.persist(&path)
            .map_err(|e| write_failure(e.error.to_string()))?;
        Ok(())
    }
}
