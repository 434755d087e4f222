//! Warning collection and reporting for index loading
//!
//! Loading prefers a usable partial graph over aborting, so recoverable
//! problems are recorded here and surfaced to the caller afterwards.

use std::collections::BTreeMap;
use std::fmt;

/// Stage where a warning was raised
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum WarningStage {
    /// An occurrence or symbol entry could not be read
    Occurrence,
    SymbolParse,
    Relationship,
    DuplicateDefinition,
    AmbiguousContainer,
}

impl fmt::Display for WarningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningStage::Occurrence => write!(f, "Occurrence"),
            WarningStage::SymbolParse => write!(f, "Symbol Parse"),
            WarningStage::Relationship => write!(f, "Relationship"),
            WarningStage::DuplicateDefinition => write!(f, "Duplicate Definition"),
            WarningStage::AmbiguousContainer => write!(f, "Ambiguous Container"),
        }
    }
}

/// A recoverable problem found while loading a document
#[derive(Debug, Clone)]
pub struct LoadWarning {
    pub path: String,
    pub message: String,
    pub stage: WarningStage,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.path, self.message)
    }
}

/// Collects warnings during a single-pass load
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<LoadWarning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning for `path`
    pub fn record(&mut self, path: &str, message: impl fmt::Display, stage: WarningStage) {
        self.warnings.push(LoadWarning {
            path: path.to_string(),
            message: message.to_string(),
            stage,
        });
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = LoadWarning>) {
        self.warnings.extend(warnings);
    }

    pub fn into_report(self) -> LoadReport {
        LoadReport::from_warnings(self.warnings)
    }
}

/// Warnings produced by a load, grouped by stage
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub warnings: Vec<LoadWarning>,
    pub summary: String,
}

impl LoadReport {
    pub fn from_warnings(warnings: Vec<LoadWarning>) -> Self {
        let summary = if warnings.is_empty() {
            "Index loaded without warnings".to_string()
        } else {
            format!("Index loaded with {} warnings", warnings.len())
        };
        Self { warnings, summary }
    }

    pub fn by_stage(&self) -> BTreeMap<WarningStage, Vec<&LoadWarning>> {
        let mut grouped: BTreeMap<WarningStage, Vec<&LoadWarning>> = BTreeMap::new();
        for warning in &self.warnings {
            grouped.entry(warning.stage).or_default().push(warning);
        }
        grouped
    }

    pub fn count(&self, stage: WarningStage) -> usize {
        self.warnings.iter().filter(|w| w.stage == stage).count()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Print a summary of the warnings to stderr
    pub fn print_summary(&self) {
        if self.warnings.is_empty() {
            eprintln!("{}", self.summary);
            return;
        }

        eprintln!("{}", self.summary);
        for (stage, warnings) in self.by_stage() {
            eprintln!("  {}: {} warnings", stage, warnings.len());

            // Show up to 5 examples per stage
            for warning in warnings.iter().take(5) {
                eprintln!("    - {}: {}", warning.path, warning.message);
            }

            if warnings.len() > 5 {
                eprintln!("    ... and {} more", warnings.len() - 5);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_groups_by_stage() {
        let mut collector = WarningCollector::new();
        collector.record("a.py", "bad uri", WarningStage::SymbolParse);
        collector.record("b.py", "bad uri", WarningStage::SymbolParse);
        collector.record("b.py", "defined twice", WarningStage::DuplicateDefinition);
        assert_eq!(collector.warning_count(), 3);

        let report = collector.into_report();
        assert!(report.has_warnings());
        assert_eq!(report.count(WarningStage::SymbolParse), 2);
        assert_eq!(report.by_stage().len(), 2);
        assert_eq!(report.summary, "Index loaded with 3 warnings");
    }

    #[test]
    fn test_empty_report() {
        let report = WarningCollector::new().into_report();
        assert!(!report.has_warnings());
        assert_eq!(report.summary, "Index loaded without warnings");
    }
}
