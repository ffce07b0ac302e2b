use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::info;

/// `==`
pub const EQ: &str = "==";
/// `!=`
pub const NEQ: &str = "!=";
/// `=gt=`
pub const GT: &str = "=gt=";
/// `=ge=`
pub const GE: &str = "=ge=";
/// `=lt=`
pub const LT: &str = "=lt=";
/// `=le=`
pub const LE: &str = "=le=";

/// Joins two sub-expressions with AND. Binds tighter than [`OR`].
pub const AND: char = ';';
/// Joins two sub-expressions with OR.
pub const OR: char = ',';

/// What a comparison asks of the field it names.
///
/// Every registered operator token maps to exactly one kind; application
/// specific tokens such as `=in=` usually map to [`ConditionKind::Custom`]
/// and are interpreted by whoever evaluates the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionKind {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEquals,
    LessThan,
    LessOrEquals,
    Custom,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionKind::Equals => "EQUALS",
            ConditionKind::NotEquals => "NOT_EQUALS",
            ConditionKind::GreaterThan => "GREATER_THAN",
            ConditionKind::GreaterOrEquals => "GREATER_OR_EQUALS",
            ConditionKind::LessThan => "LESS_THAN",
            ConditionKind::LessOrEquals => "LESS_OR_EQUALS",
            ConditionKind::Custom => "CUSTOM",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("the operator '{token}' is already defined and cannot be overwritten")]
    DuplicateOperator { token: String },
    #[error("operator tokens must not be empty")]
    EmptyToken,
}

/// Token → [`ConditionKind`] table consulted by the comparison matcher.
///
/// Build one at startup, register the application's extra tokens, then share
/// it read-only (by reference or inside an `Arc`) with every parser. The table
/// is never mutated while a parse is running because parsers only ever see a
/// shared borrow.
///
/// ```
/// use fiql_syntax::{ConditionKind, Operators};
///
/// let mut operators = Operators::new();
/// operators.register("=in=", ConditionKind::Custom).unwrap();
/// assert!(operators.register("=in=", ConditionKind::Equals).is_err());
/// assert_eq!(operators.resolve("=in="), Some(ConditionKind::Custom));
/// ```
#[derive(Debug, Clone)]
pub struct Operators {
    kinds: HashMap<String, ConditionKind>,
    // Longest first so `=gte=` wins over `=gt` when both start at one position.
    by_length: Vec<String>,
}

impl Default for Operators {
    fn default() -> Self {
        Self::new()
    }
}

impl Operators {
    /// Registry holding only the six built-in comparison tokens.
    pub fn new() -> Self {
        let mut operators = Self::empty();
        for (token, kind) in [
            (GT, ConditionKind::GreaterThan),
            (GE, ConditionKind::GreaterOrEquals),
            (LT, ConditionKind::LessThan),
            (LE, ConditionKind::LessOrEquals),
            (EQ, ConditionKind::Equals),
            (NEQ, ConditionKind::NotEquals),
        ] {
            operators.insert(token.to_string(), kind);
        }
        operators
    }

    fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
            by_length: Vec::new(),
        }
    }

    /// Adds `token` to the table. The first registration of a token stays
    /// authoritative: a second attempt fails and leaves the table untouched.
    pub fn register(
        &mut self,
        token: impl Into<String>,
        kind: ConditionKind,
    ) -> Result<&mut Self, RegistryError> {
        let token = token.into();
        if token.is_empty() {
            return Err(RegistryError::EmptyToken);
        }
        if self.kinds.contains_key(&token) {
            return Err(RegistryError::DuplicateOperator { token });
        }
        info!(token = token.as_str(), %kind, "registered operator");
        self.insert(token, kind);
        Ok(self)
    }

    fn insert(&mut self, token: String, kind: ConditionKind) {
        let at = self
            .by_length
            .iter()
            .position(|existing| existing.len() < token.len())
            .unwrap_or(self.by_length.len());
        self.by_length.insert(at, token.clone());
        self.kinds.insert(token, kind);
    }

    pub fn resolve(&self, token: &str) -> Option<ConditionKind> {
        self.kinds.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.kinds.contains_key(token)
    }

    /// Registered tokens, longest first.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.by_length.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Finds the operator of a single comparison: the leftmost registered
    /// token preceded by at least one byte of name. Among tokens starting at
    /// the same byte the longest one wins.
    ///
    /// Built-in tokens start with `=` or `!`, which never occur in accessor
    /// names, so the match always starts right after the selector. A custom
    /// token that starts with a name character (say `in`) can instead match
    /// inside the selector itself: `origin==x` then splits as `orig` `in`
    /// `==x`.
    pub(crate) fn find(&self, fragment: &str) -> Option<OperatorMatch<'_>> {
        for (start, _) in fragment.char_indices().skip(1) {
            let rest = &fragment[start..];
            for token in &self.by_length {
                if rest.starts_with(token.as_str()) {
                    return Some(OperatorMatch {
                        start,
                        end: start + token.len(),
                        token,
                        kind: self.kinds[token.as_str()],
                    });
                }
            }
        }
        None
    }
}

pub(crate) struct OperatorMatch<'a> {
    pub start: usize,
    pub end: usize,
    pub token: &'a str,
    pub kind: ConditionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_resolve_to_their_kinds() {
        let operators = Operators::new();
        assert_eq!(operators.len(), 6);
        assert_eq!(operators.resolve(EQ), Some(ConditionKind::Equals));
        assert_eq!(operators.resolve(NEQ), Some(ConditionKind::NotEquals));
        assert_eq!(operators.resolve(GT), Some(ConditionKind::GreaterThan));
        assert_eq!(operators.resolve(GE), Some(ConditionKind::GreaterOrEquals));
        assert_eq!(operators.resolve(LT), Some(ConditionKind::LessThan));
        assert_eq!(operators.resolve(LE), Some(ConditionKind::LessOrEquals));
        assert_eq!(operators.resolve("=in="), None);
    }

    #[test]
    fn duplicate_registration_keeps_the_first_kind() {
        let mut operators = Operators::new();
        operators.register("=in=", ConditionKind::Custom).unwrap();
        let err = operators
            .register("=in=", ConditionKind::Equals)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateOperator {
                token: "=in=".into()
            }
        );
        assert_eq!(operators.resolve("=in="), Some(ConditionKind::Custom));
    }

    #[test]
    fn builtins_cannot_be_overwritten() {
        let mut operators = Operators::new();
        assert!(matches!(
            operators.register(EQ, ConditionKind::Custom),
            Err(RegistryError::DuplicateOperator { .. })
        ));
        assert_eq!(operators.resolve(EQ), Some(ConditionKind::Equals));
    }

    #[test]
    fn empty_token_is_rejected() {
        let mut operators = Operators::new();
        assert_eq!(
            operators.register("", ConditionKind::Custom).unwrap_err(),
            RegistryError::EmptyToken
        );
    }

    #[test]
    fn tokens_are_ordered_longest_first() {
        let mut operators = Operators::new();
        operators.register("=out=", ConditionKind::Custom).unwrap();
        let tokens: Vec<_> = operators.tokens().collect();
        assert_eq!(tokens[0], "=out=");
        let lengths: Vec<_> = tokens.iter().map(|t| t.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn find_prefers_leftmost_then_longest() {
        let mut operators = Operators::new();
        operators.register("=g", ConditionKind::Custom).unwrap();

        let found = operators.find("year=ge=2000").unwrap();
        assert_eq!(found.token, GE);
        assert_eq!(found.start, 4);
        assert_eq!(found.end, 8);

        let found = operators.find("name==a==b").unwrap();
        assert_eq!(found.token, EQ);
        assert_eq!(found.start, 4);
    }

    #[test]
    fn find_requires_a_name() {
        let operators = Operators::new();
        assert!(operators.find("==Nolan").is_none());
        assert!(operators.find("name").is_none());
        assert!(operators.find("").is_none());
    }

    #[test]
    fn word_token_can_match_inside_the_selector() {
        let mut operators = Operators::new();
        operators.register("in", ConditionKind::Custom).unwrap();

        let found = operators.find("origin==x").unwrap();
        assert_eq!(found.token, "in");
        assert_eq!(&"origin==x"[..found.start], "orig");
        assert_eq!(&"origin==x"[found.end..], "==x");
    }
}
