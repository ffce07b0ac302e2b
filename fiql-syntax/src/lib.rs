//! # FIQL expression syntax
//!
//! `fiql-syntax` turns a compact filter expression such as
//! `name==Nolan;year=ge=2000,director.lastName==Scott` into a tree of AND/OR
//! groups whose leaves are single comparisons. It knows nothing about the
//! record type the expression will later be bound to: leaves keep the raw
//! argument text and only carry the [`ConditionKind`] their operator token was
//! registered with.
//!
//! Grammar:
//! - `;` joins with AND, `,` joins with OR, and AND binds tighter.
//! - `(` ... `)` groups a sub-expression explicitly.
//! - A leaf is `<selector><operator><argument>` where the operator is one of
//!   the tokens registered in [`Operators`].
//!
//! ## Example
//! ```
//! use fiql_syntax::{parse_expression, ConditionKind, Expr, Operators};
//!
//! let operators = Operators::new();
//! let expr = parse_expression("a==1;b==2,c==3", &operators).unwrap();
//! let Expr::Or(branches) = &expr else { panic!() };
//! // AND binds tighter: (a==1 AND b==2) OR c==3
//! assert!(matches!(&branches[0], Expr::And(parts) if parts.len() == 2));
//! let Expr::Leaf(last) = &branches[1] else { panic!() };
//! assert_eq!(last.selector, "c");
//! assert_eq!(last.kind, ConditionKind::Equals);
//! ```

mod operators;

pub use operators::*;

use serde::{Deserialize, Serialize};
use std::{fmt, mem, ops::Range};
use thiserror::Error;

/// Splits `input` into a precedence-correct expression tree.
///
/// The result is always the simplest equivalent shape: a lone comparison is
/// returned as a leaf, and single-member AND/OR groups are never produced.
pub fn parse_expression(input: &str, operators: &Operators) -> Result<Expr, ParseError> {
    Parser { input, operators }.parse_group(0..input.len(), 0)
}

/// Deepest bracket nesting [`parse_expression`] accepts.
pub const MAX_NESTING: usize = 128;

/// Boolean structure of a FIQL expression.
///
/// `And`/`Or` keep flat vectors in textual order. Order carries no meaning
/// for evaluation but keeps error messages and rendering stable. The tree is
/// generic over its leaves so callers can bind every [`Comparison`] into a
/// typed constraint with [`Expr::try_map_leaves`] while keeping the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr<L = Comparison> {
    /// Members joined with `;`.
    ///
    /// ```
    /// use fiql_syntax::{parse_expression, Expr, Operators};
    /// let expr = parse_expression("a==1;b==2", &Operators::new()).unwrap();
    /// assert!(matches!(expr, Expr::And(parts) if parts.len() == 2));
    /// ```
    And(Vec<Expr<L>>),
    /// Members joined with `,`.
    ///
    /// ```
    /// use fiql_syntax::{parse_expression, Expr, Operators};
    /// let expr = parse_expression("a==1,b==2", &Operators::new()).unwrap();
    /// assert!(matches!(expr, Expr::Or(parts) if parts.len() == 2));
    /// ```
    Or(Vec<Expr<L>>),
    /// A single comparison.
    Leaf(L),
}

impl<L> Expr<L> {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Expr::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&L> {
        match self {
            Expr::Leaf(leaf) => Some(leaf),
            Expr::And(_) | Expr::Or(_) => None,
        }
    }

    /// Members of a group, or an empty slice for a leaf.
    pub fn children(&self) -> &[Expr<L>] {
        match self {
            Expr::And(parts) | Expr::Or(parts) => parts,
            Expr::Leaf(_) => &[],
        }
    }

    /// Leaves in depth-first, left-to-right (i.e. textual) order.
    pub fn leaves(&self) -> Vec<&L> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a L>) {
        match self {
            Expr::Leaf(leaf) => out.push(leaf),
            Expr::And(parts) | Expr::Or(parts) => {
                for part in parts {
                    part.collect_leaves(out);
                }
            }
        }
    }

    /// Rebuilds the tree with every leaf passed through `f`, stopping at the
    /// first failure.
    pub fn try_map_leaves<M, E, F>(self, f: &mut F) -> Result<Expr<M>, E>
    where
        F: FnMut(L) -> Result<M, E>,
    {
        let map_all = |parts: Vec<Expr<L>>, f: &mut F| -> Result<Vec<Expr<M>>, E> {
            let mut mapped = Vec::with_capacity(parts.len());
            for part in parts {
                mapped.push(part.try_map_leaves(f)?);
            }
            Ok(mapped)
        };
        match self {
            Expr::Leaf(leaf) => Ok(Expr::Leaf(f(leaf)?)),
            Expr::And(parts) => Ok(Expr::And(map_all(parts, f)?)),
            Expr::Or(parts) => Ok(Expr::Or(map_all(parts, f)?)),
        }
    }
}

impl<L: fmt::Display> fmt::Display for Expr<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, parts) = match self {
            Expr::Leaf(leaf) => return write!(f, "{leaf}"),
            Expr::And(parts) => ("AND", parts),
            Expr::Or(parts) => ("OR", parts),
        };
        write!(f, "{label}:[")?;
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str("]")
    }
}

/// `selector operator argument`, e.g. `director.lastName` `==` `Nolan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    /// Dotted accessor path, taken verbatim.
    pub selector: String,
    /// The registered token that matched.
    pub operator: String,
    /// Kind registered for `operator`.
    pub kind: ConditionKind,
    /// Everything after the operator up to the end of the sub-expression.
    /// Never empty.
    pub argument: String,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.selector, self.operator, self.argument)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `)` without an opener, or a `(` that is never closed. `position` is
    /// the byte offset of the offending bracket in the original input.
    #[error("unmatched bracket at byte {position}")]
    UnmatchedBracket { position: usize },
    /// The expression ends with `;` or `,`.
    #[error("dangling operator at the end of expression: ...{fragment}")]
    DanglingOperator { fragment: String },
    /// A leaf without a registered operator, or with an empty name or value.
    #[error("not a comparison expression: {fragment:?}")]
    InvalidComparison { fragment: String },
    /// More than [`MAX_NESTING`] levels of brackets. `position` is the byte
    /// offset of the first `(` past the limit.
    #[error("brackets nested deeper than {limit} levels at byte {position}")]
    NestingTooDeep { position: usize, limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    And,
    Or,
}

/// Bracket-depth splitter. Every method works on byte ranges of the original
/// input so reported positions stay absolute inside nested groups.
struct Parser<'a> {
    input: &'a str,
    operators: &'a Operators,
}

impl<'a> Parser<'a> {
    fn parse_group(&self, range: Range<usize>, depth: usize) -> Result<Expr, ParseError> {
        let fragments = self.split(range)?;

        // Consecutive AND-joined fragments form one conjunction; each OR
        // boundary (and the end) closes it into a branch of the disjunction.
        let mut branches = Vec::new();
        let mut conjunction = Vec::new();
        for (fragment, combinator) in fragments {
            conjunction.push(self.parse_atom(fragment, depth)?);
            if combinator != Some(Combinator::And) {
                branches.push(collapse(mem::take(&mut conjunction), Expr::And));
            }
        }
        Ok(collapse(branches, Expr::Or))
    }

    // Cuts at depth-0 combinators. Each fragment is paired with the
    // combinator that follows it; the last one is always followed by `None`.
    fn split(
        &self,
        range: Range<usize>,
    ) -> Result<Vec<(Range<usize>, Option<Combinator>)>, ParseError> {
        let mut fragments = Vec::new();
        let mut open = Vec::new();
        let mut last = range.start;
        for (offset, ch) in self.input[range.clone()].char_indices() {
            let position = range.start + offset;
            match ch {
                '(' => open.push(position),
                ')' => {
                    if open.pop().is_none() {
                        return Err(ParseError::UnmatchedBracket { position });
                    }
                }
                AND | OR if open.is_empty() => {
                    let combinator = if ch == AND {
                        Combinator::And
                    } else {
                        Combinator::Or
                    };
                    fragments.push((last..position, Some(combinator)));
                    last = position + ch.len_utf8();
                }
                _ => {}
            }
        }

        if let Some(&position) = open.first() {
            return Err(ParseError::UnmatchedBracket { position });
        }

        if let Some((fragment, _)) = fragments.last() {
            if last == range.end {
                let start = fragment.start;
                return Err(ParseError::DanglingOperator {
                    fragment: self.input[start..range.end].to_string(),
                });
            }
        }

        fragments.push((last..range.end, None));
        Ok(fragments)
    }

    // An atom is either a fully bracketed sub-expression or one comparison.
    fn parse_atom(&self, range: Range<usize>, depth: usize) -> Result<Expr, ParseError> {
        let fragment = &self.input[range.clone()];
        if fragment.starts_with('(') {
            if closing_bracket(fragment) != Some(fragment.len() - 1) {
                return Err(invalid(fragment));
            }
            if depth == MAX_NESTING {
                return Err(ParseError::NestingTooDeep {
                    position: range.start,
                    limit: MAX_NESTING,
                });
            }
            return self.parse_group(range.start + 1..range.end - 1, depth + 1);
        }
        self.parse_comparison(fragment).map(Expr::Leaf)
    }

    fn parse_comparison(&self, fragment: &str) -> Result<Comparison, ParseError> {
        let found = self
            .operators
            .find(fragment)
            .ok_or_else(|| invalid(fragment))?;
        let argument = &fragment[found.end..];
        if argument.is_empty() {
            return Err(invalid(fragment));
        }
        Ok(Comparison {
            selector: fragment[..found.start].to_string(),
            operator: found.token.to_string(),
            kind: found.kind,
            argument: argument.to_string(),
        })
    }
}

fn collapse(mut parts: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    match parts.len() {
        1 => parts.remove(0),
        _ => wrap(parts),
    }
}

/// Byte offset of the `)` matching the `(` at the start of `fragment`.
fn closing_bracket(fragment: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, ch) in fragment.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn invalid(fragment: &str) -> ParseError {
    ParseError::InvalidComparison {
        fragment: fragment.to_string(),
    }
}
