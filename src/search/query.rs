//! Typed queries accepted by the searcher
//!
//! The textual form is `type:<tag> <arguments>`, e.g.
//! `type:replace "old name" new_name false`.

use std::fmt;
use std::str::FromStr;

use crate::symbol::{Symbol, SymbolError, SymbolResult};

/// A parsed searcher query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// All references of a symbol, grouped by file
    Symbol(Symbol),
    /// Source text at the symbol's definition site
    Source(Symbol),
    /// Literal text search across every indexed file
    Exact(String),
    /// Literal find and replace, writing files only when `do_write` is set
    Replace {
        find: String,
        replace_with: String,
        do_write: bool,
    },
}

impl Query {
    pub fn parse(text: &str) -> SymbolResult<Self> {
        let text = text.trim();
        let (tag, rest) = match text.split_once(char::is_whitespace) {
            Some((tag, rest)) => (tag, rest.trim()),
            None => (text, ""),
        };

        match tag {
            "type:symbol" => Ok(Self::Symbol(parse_uri(text, rest)?)),
            "type:source" => Ok(Self::Source(parse_uri(text, rest)?)),
            "type:exact" => {
                let pattern = strip_quotes(rest);
                if pattern.is_empty() {
                    return Err(SymbolError::malformed_query(text, "missing search pattern"));
                }
                Ok(Self::Exact(pattern.to_string()))
            }
            "type:replace" => {
                let args = tokenize(text, rest)?;
                let [find, replace_with, do_write] = <[String; 3]>::try_from(args).map_err(|args| {
                    SymbolError::malformed_query(
                        text,
                        format!("expected <find> <replace> <true|false>, got {} arguments", args.len()),
                    )
                })?;
                if find.is_empty() {
                    return Err(SymbolError::malformed_query(text, "find string is empty"));
                }
                let do_write = match do_write.to_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(SymbolError::malformed_query(
                            text,
                            format!("do_write must be true or false, got '{}'", other),
                        ))
                    }
                };
                Ok(Self::Replace {
                    find,
                    replace_with,
                    do_write,
                })
            }
            _ => Err(SymbolError::UnsupportedQueryType(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Symbol(_) => "type:symbol",
            Self::Source(_) => "type:source",
            Self::Exact(_) => "type:exact",
            Self::Replace { .. } => "type:replace",
        }
    }
}

impl FromStr for Query {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(symbol) | Self::Source(symbol) => write!(f, "{} {}", self.tag(), symbol),
            // The pattern is taken verbatim between one pair of quotes
            Self::Exact(pattern) => write!(f, "{} \"{}\"", self.tag(), pattern),
            Self::Replace {
                find,
                replace_with,
                do_write,
            } => write!(
                f,
                "{} {} {} {}",
                self.tag(),
                quote(find),
                quote(replace_with),
                do_write
            ),
        }
    }
}

fn parse_uri(query: &str, rest: &str) -> SymbolResult<Symbol> {
    if rest.is_empty() {
        return Err(SymbolError::malformed_query(query, "missing symbol URI"));
    }
    Symbol::parse(rest)
}

fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Split on whitespace, keeping double-quoted tokens together.
/// Inside quotes `\"` and `\\` are escapes.
fn tokenize(query: &str, args: &str) -> SymbolResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = args.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if c == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' if matches!(chars.peek(), Some('"' | '\\')) => {
                        if let Some(escaped) = chars.next() {
                            token.push(escaped);
                        }
                    }
                    _ => token.push(c),
                }
            }
            if !closed {
                return Err(SymbolError::malformed_query(query, "unterminated quote"));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "scip-python python demo 1.0 `a.b`/C#m().";

    #[test]
    fn test_parse_symbol_and_source() {
        let query = Query::parse(&format!("type:symbol {}", URI)).unwrap();
        assert_eq!(query, Query::Symbol(Symbol::parse(URI).unwrap()));

        let query: Query = format!("  type:source   {}  ", URI).parse().unwrap();
        assert_eq!(query, Query::Source(Symbol::parse(URI).unwrap()));
    }

    #[test]
    fn test_parse_exact_strips_one_layer_of_quotes() {
        assert_eq!(Query::parse("type:exact \"foo\"").unwrap(), Query::Exact("foo".into()));
        assert_eq!(Query::parse("type:exact foo bar").unwrap(), Query::Exact("foo bar".into()));
        assert_eq!(
            Query::parse("type:exact \"\"quoted\"\"").unwrap(),
            Query::Exact("\"quoted\"".into())
        );
    }

    #[test]
    fn test_parse_replace() {
        assert_eq!(
            Query::parse("type:replace \"Old\" \"New\" false").unwrap(),
            Query::Replace {
                find: "Old".into(),
                replace_with: "New".into(),
                do_write: false,
            }
        );
        assert_eq!(
            Query::parse("type:replace \"old name\" \"\" TRUE").unwrap(),
            Query::Replace {
                find: "old name".into(),
                replace_with: String::new(),
                do_write: true,
            }
        );
    }

    #[test]
    fn test_malformed_queries() {
        for text in [
            "type:symbol",
            "type:exact",
            "type:exact \"\"",
            "type:replace Old New",
            "type:replace Old New maybe",
            "type:replace \"\" New true",
            "type:replace \"Old New false",
        ] {
            assert!(
                matches!(Query::parse(text), Err(SymbolError::MalformedQuery { .. })),
                "{} should be malformed",
                text
            );
        }
    }

    #[test]
    fn test_bad_uri_and_unknown_tag() {
        assert!(matches!(
            Query::parse("type:symbol not-a-symbol"),
            Err(SymbolError::MalformedSymbolUri { .. })
        ));
        assert!(matches!(
            Query::parse("type:fuzzy foo"),
            Err(SymbolError::UnsupportedQueryType(tag)) if tag == "type:fuzzy"
        ));
        assert!(matches!(
            Query::parse(""),
            Err(SymbolError::UnsupportedQueryType(_))
        ));
    }

    #[test]
    fn test_display_parses_back() {
        let query = Query::Replace {
            find: "say \"hi\"".into(),
            replace_with: "greet".into(),
            do_write: true,
        };
        assert_eq!(Query::parse(&query.to_string()).unwrap(), query);

        let exact = Query::Exact("say \"hi\"".into());
        assert_eq!(Query::parse(&exact.to_string()).unwrap(), exact);
    }
}
