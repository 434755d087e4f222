//! Containment resolution over defined symbols
//!
//! A symbol's container is the defined symbol whose descriptor path is the
//! longest strict prefix of its own. Candidates are looked up by the
//! canonical key of each prefix, so resolution is linear in the total
//! descriptor length instead of quadratic in the symbol count.

use std::collections::{HashMap, HashSet};

use crate::index::{WarningCollector, WarningStage};
use crate::symbol::{Symbol, SymbolError, SymbolResult};

/// Resolve the immediate container of every defined symbol.
///
/// `defined` must be in file order: when several defined symbols share the
/// same structural key, the first one wins and a warning is recorded.
pub fn resolve_containers(
    defined: &[(Symbol, String)],
    warnings: &mut WarningCollector,
) -> HashMap<Symbol, Symbol> {
    let mut by_key: HashMap<String, Vec<&Symbol>> = HashMap::new();
    for (symbol, _) in defined {
        if symbol.is_local() {
            continue;
        }
        by_key.entry(symbol.structural_key()).or_default().push(symbol);
    }

    let mut parents = HashMap::new();
    for (symbol, path) in defined {
        if symbol.is_local() {
            continue;
        }
        for len in (1..symbol.descriptors().len()).rev() {
            let Some(candidates) = by_key.get(&symbol.prefix_key(len)) else {
                continue;
            };
            if candidates.len() > 1 {
                warnings.record(
                    path,
                    format!(
                        "{} has {} equally specific containers; using {}",
                        symbol,
                        candidates.len(),
                        candidates[0]
                    ),
                    WarningStage::AmbiguousContainer,
                );
            }
            parents.insert(symbol.clone(), candidates[0].clone());
            break;
        }
    }
    parents
}

/// Reject a parent map in which any symbol is its own transitive container
pub fn ensure_acyclic(parents: &HashMap<Symbol, Symbol>) -> SymbolResult<()> {
    for start in parents.keys() {
        let mut seen: HashSet<&Symbol> = HashSet::new();
        seen.insert(start);
        let mut current = start;
        while let Some(parent) = parents.get(current) {
            if !seen.insert(parent) {
                return Err(SymbolError::IndexLoadFailure(format!(
                    "containment cycle through {}",
                    parent
                )));
            }
            current = parent;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "scip-python python demo 1.0";

    fn sym(descriptors: &str) -> Symbol {
        Symbol::parse(&format!("{} {}", PREFIX, descriptors)).unwrap()
    }

    fn defined(symbols: &[&str]) -> Vec<(Symbol, String)> {
        symbols
            .iter()
            .map(|s| (sym(s), "a/b.py".to_string()))
            .collect()
    }

    #[test]
    fn test_longest_prefix_wins() {
        let defs = defined(&["`a.b`/", "`a.b`/C#", "`a.b`/C#m().", "`a.b`/C#m().(x)"]);
        let mut warnings = WarningCollector::new();
        let parents = resolve_containers(&defs, &mut warnings);

        assert_eq!(parents.get(&sym("`a.b`/C#m().(x)")), Some(&sym("`a.b`/C#m().")));
        assert_eq!(parents.get(&sym("`a.b`/C#m().")), Some(&sym("`a.b`/C#")));
        assert_eq!(parents.get(&sym("`a.b`/C#")), Some(&sym("`a.b`/")));
        assert_eq!(parents.get(&sym("`a.b`/")), None);
        assert_eq!(warnings.warning_count(), 0);
    }

    #[test]
    fn test_skips_undefined_intermediate() {
        // The class itself is not defined, so the method falls back to the module
        let defs = defined(&["`a.b`/", "`a.b`/C#m()."]);
        let mut warnings = WarningCollector::new();
        let parents = resolve_containers(&defs, &mut warnings);

        assert_eq!(parents.get(&sym("`a.b`/C#m().")), Some(&sym("`a.b`/")));
    }

    #[test]
    fn test_ambiguous_container_uses_first() {
        // Same structure written with and without redundant escaping
        let first = sym("`a.b`/C#");
        let second = sym("`a.b`/`C`#");
        let child = sym("`a.b`/C#m().");
        let defs = vec![
            (first.clone(), "a/b.py".to_string()),
            (second, "a/b.py".to_string()),
            (child.clone(), "a/b.py".to_string()),
        ];
        let mut warnings = WarningCollector::new();
        let parents = resolve_containers(&defs, &mut warnings);

        assert_eq!(parents.get(&child), Some(&first));
        assert_eq!(
            warnings.into_report().count(WarningStage::AmbiguousContainer),
            1
        );
    }

    #[test]
    fn test_ensure_acyclic_rejects_cycles() {
        let a = sym("`a`/A#");
        let b = sym("`a`/B#");
        let mut parents = HashMap::new();
        parents.insert(a.clone(), b.clone());
        assert!(ensure_acyclic(&parents).is_ok());

        parents.insert(b, a);
        assert!(matches!(
            ensure_acyclic(&parents),
            Err(SymbolError::IndexLoadFailure(_))
        ));
    }
}
