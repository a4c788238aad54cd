//! Table exclusion patterns
//!
//! Patterns use SQL `LIKE` syntax so they read the same as the catalog
//! filters an operator would write by hand: `%` matches any run of
//! characters, `_` matches exactly one, and `\` escapes either.

use std::fmt;

use crate::error::DomainError;

/// Patterns excluded from auditing unless configured otherwise
pub const DEFAULT_EXCLUDED_PATTERNS: &[&str] = &["alembic_%", "_sqlx_migrations"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyRun,
}

/// A compiled `LIKE` pattern matched against table names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePattern {
    source: String,
    tokens: Vec<Token>,
}

impl TablePattern {
    pub fn parse(pattern: &str) -> Result<Self, DomainError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidPattern(
                "pattern must not be empty".to_string(),
            ));
        }

        let mut tokens = Vec::with_capacity(trimmed.len());
        let mut chars = trimmed.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some(escaped) => tokens.push(Token::Literal(escaped)),
                    None => {
                        return Err(DomainError::InvalidPattern(format!(
                            "dangling escape at end of pattern: {trimmed}"
                        )))
                    }
                },
                '%' => {
                    // Consecutive runs collapse into one
                    if tokens.last() != Some(&Token::AnyRun) {
                        tokens.push(Token::AnyRun);
                    }
                }
                '_' => tokens.push(Token::AnyOne),
                other => tokens.push(Token::Literal(other)),
            }
        }

        Ok(Self {
            source: trimmed.to_string(),
            tokens,
        })
    }

    /// Parse a comma-separated list, skipping blank entries
    pub fn parse_list(list: &str) -> Result<Vec<Self>, DomainError> {
        list.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_EXCLUDED_PATTERNS
            .iter()
            .filter_map(|p| Self::parse(p).ok())
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Case-sensitive match, like `LIKE` on a `name` column
    pub fn matches(&self, name: &str) -> bool {
        let text: Vec<char> = name.chars().collect();
        let (mut t, mut p) = (0usize, 0usize);
        // Backtrack point: (pattern index after the last `%`, text index it resumed from)
        let mut star: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(Token::AnyRun) => {
                    star = Some((p + 1, t));
                    p += 1;
                }
                Some(Token::AnyOne) => {
                    t += 1;
                    p += 1;
                }
                Some(Token::Literal(c)) if *c == text[t] => {
                    t += 1;
                    p += 1;
                }
                _ => match star {
                    Some((star_p, star_t)) => {
                        p = star_p;
                        t = star_t + 1;
                        star = Some((star_p, star_t + 1));
                    }
                    None => return false,
                },
            }
        }

        self.tokens[p..].iter().all(|tok| *tok == Token::AnyRun)
    }
}

impl fmt::Display for TablePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for TablePattern {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
