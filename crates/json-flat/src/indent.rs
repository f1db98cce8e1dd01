//! Pretty-printing unit for slots, i.e. the serializer's `space` argument.

/// Longest indentation unit the serializer honours.
const MAX_INDENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indent {
    /// Indent with this many spaces (at most 10).
    Spaces(usize),
    /// Indent with this text (its first 10 characters).
    Text(String),
}

impl Indent {
    /// The indentation unit, or `None` when output should stay compact.
    pub fn unit(&self) -> Option<String> {
        let unit: String = match self {
            Indent::Spaces(n) => " ".repeat((*n).min(MAX_INDENT)),
            Indent::Text(s) => s.chars().take(MAX_INDENT).collect(),
        };
        if unit.is_empty() {
            None
        } else {
            Some(unit)
        }
    }
}

impl From<usize> for Indent {
    fn from(n: usize) -> Self {
        Indent::Spaces(n)
    }
}

impl From<&str> for Indent {
    fn from(s: &str) -> Self {
        Indent::Text(s.to_owned())
    }
}

impl From<String> for Indent {
    fn from(s: String) -> Self {
        Indent::Text(s)
    }
}
