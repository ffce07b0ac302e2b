//! Process-wide operator table and the query-string entry point built on it.

use crate::{catalog::Record, error::QueryError, parser::Parser};
use fiql_syntax::{ConditionKind, Operators};
use once_cell::sync::Lazy;
use tracing::{error, warn};

/// Membership test, `genres=in=(drama,crime)`.
pub const IN: &str = "=in=";
/// Negated membership test.
pub const OUT: &str = "=out=";

static OPERATORS: Lazy<Operators> = Lazy::new(|| {
    let mut operators = Operators::new();
    for token in [IN, OUT] {
        if let Err(e) = operators.register(token, ConditionKind::Custom) {
            error!(?e, token, "failed to register application operator");
        }
    }
    operators
});

/// The built-in operators plus [`IN`] and [`OUT`], both
/// [`ConditionKind::Custom`]. Initialized on first use.
pub fn operators() -> &'static Operators {
    &OPERATORS
}

/// Turns a request query string into a populated record.
///
/// A blank query yields `Ok(None)`. Otherwise every comparison is written
/// onto one fresh instance of `R`.
pub fn from_query_string<R: Record>(query: &str) -> Result<Option<R>, QueryError> {
    if query.trim().is_empty() {
        return Ok(None);
    }
    let parser = Parser::<R>::new(operators())?;
    match parser.populate(query) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!(query, error = %e, "rejected query string");
            Err(e)
        }
    }
}
