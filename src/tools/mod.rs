//! Text tools for an agent loop on top of [`SymbolSearcher`]
//!
//! Every tool takes a single string argument and returns text. Engine
//! errors are rendered into the returned text instead of propagated, so a
//! bad query never interrupts the caller.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::search::SymbolSearcher;
use crate::symbol::Symbol;

pub type ToolFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A named, described callable exposed to an agent
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    func: ToolFn,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: impl Into<String>, func: ToolFn) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            func,
        }
    }

    pub fn run(&self, input: &str) -> String {
        (self.func)(input)
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Anything that can hand a set of tools to an agent
pub trait AgentTool {
    fn build(&self) -> Vec<Tool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchTool {
    SymbolRankSearch,
    SymbolReferences,
    RetrieveSourceCodeBySymbol,
    ExactSearch,
}

impl SearchTool {
    pub const ALL: [SearchTool; 4] = [
        Self::SymbolRankSearch,
        Self::SymbolReferences,
        Self::RetrieveSourceCodeBySymbol,
        Self::ExactSearch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::SymbolRankSearch => "symbol-rank-search",
            Self::SymbolReferences => "symbol-references",
            Self::RetrieveSourceCodeBySymbol => "retrieve-source-code-by-symbol",
            Self::ExactSearch => "exact-search",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SymbolRankSearch => {
                "Performs a ranked search of symbols based on a given query string."
            }
            Self::SymbolReferences => {
                "Finds all the references to a given symbol within the codebase."
            }
            Self::RetrieveSourceCodeBySymbol => {
                "Returns the source code corresponding to a given symbol."
            }
            Self::ExactSearch => {
                "Performs an exact search for a given pattern across the codebase."
            }
        }
    }
}

impl fmt::Display for SearchTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchTool {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| format!("unknown search tool '{}'", s))
    }
}

/// Exposes the searcher's lookups as agent tools
#[derive(Clone)]
pub struct SymbolSearchTool {
    searcher: SymbolSearcher,
    tools: Vec<SearchTool>,
}

impl SymbolSearchTool {
    /// All search tools
    pub fn new(searcher: SymbolSearcher) -> Self {
        Self {
            searcher,
            tools: SearchTool::ALL.to_vec(),
        }
    }

    /// Only the listed tools, in the given order
    pub fn with_tools(searcher: SymbolSearcher, tools: Vec<SearchTool>) -> Self {
        Self { searcher, tools }
    }

    pub fn build_tool(&self, tool: SearchTool) -> Tool {
        let searcher = self.searcher.clone();
        let func: ToolFn = Arc::new(move |input: &str| run_tool(&searcher, tool, input));
        Tool::new(tool.name(), tool.description(), func)
    }

    /// Run one tool directly
    pub fn process_query(&self, tool: SearchTool, input: &str) -> String {
        run_tool(&self.searcher, tool, input)
    }
}

impl AgentTool for SymbolSearchTool {
    fn build(&self) -> Vec<Tool> {
        self.tools.iter().map(|&tool| self.build_tool(tool)).collect()
    }
}

fn run_tool(searcher: &SymbolSearcher, tool: SearchTool, input: &str) -> String {
    let input = input.trim();
    match tool {
        SearchTool::SymbolRankSearch => {
            let ranked = searcher.symbol_rank_search(input);
            if ranked.is_empty() {
                return "No Result Found".to_string();
            }
            ranked
                .iter()
                .map(|ranked| ranked.symbol.uri().to_string())
                .collect::<Vec<_>>()
                .join("\n")
        }
        SearchTool::SymbolReferences => match Symbol::parse(input) {
            Ok(symbol) => {
                let mut output = String::new();
                for (path, occurrences) in searcher.symbol_references(&symbol) {
                    for occurrence in occurrences {
                        output.push_str(&format!(
                            "{}:{} ({})\n",
                            path, occurrence.range, occurrence.roles
                        ));
                    }
                }
                if output.is_empty() {
                    "No Result Found".to_string()
                } else {
                    output.trim_end().to_string()
                }
            }
            Err(e) => format!("Failed to find references - {}", e),
        },
        SearchTool::RetrieveSourceCodeBySymbol => {
            match Symbol::parse(input).and_then(|s| searcher.retrieve_source_code_by_symbol(&s)) {
                Ok(Some(source)) if !source.trim().is_empty() => source,
                Ok(_) => "No Result Found".to_string(),
                Err(e) => format!("Failed to retrieve source code - {}", e),
            }
        }
        SearchTool::ExactSearch => match searcher.exact_search(strip_quotes(input)) {
            Ok(result) if result.is_empty() => "No Result Found".to_string(),
            Ok(result) => result
                .matches
                .values()
                .flatten()
                .map(|m| {
                    format!(
                        "{}:{}:{} [{}] {}",
                        m.file_path,
                        m.line,
                        m.column,
                        m.attribution,
                        m.line_text.trim()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => format!("Failed to run exact search - {}", e),
        },
    }
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}
