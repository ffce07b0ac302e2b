//! Binds FIQL expressions to typed records.
//!
//! [`fiql_syntax`] produces the boolean structure of an expression. This crate
//! resolves each selector against the accessor [`Catalog`] of a [`Record`]
//! type, casts every argument to the accessor's declared type and then either
//! materializes a [`Predicate`] tree of populated templates
//! ([`Parser::parse`]) or writes everything onto one instance
//! ([`Parser::populate`]).
mod cast;
mod catalog;
mod error;
mod parser;
mod predicate;
mod query_string;
mod template;
mod value;

pub use cast::{TIMESTAMP_FORMAT, cast, cast_decimal, cast_timestamp};
pub use catalog::{Catalog, Fields, PATH_SEPARATOR, Record};
pub use error::{AccessError, CastError, CatalogError, QueryError};
pub use fiql_syntax::{
    AND, Comparison, ConditionKind, EQ, Expr, GE, GT, LE, LT, MAX_NESTING, NEQ, OR, Operators,
    ParseError, RegistryError, parse_expression,
};
pub use parser::{Constraint, Parser};
pub use predicate::Predicate;
pub use query_string::{IN, OUT, from_query_string, operators};
pub use template::Template;
pub use value::{DynRecord, FieldValue, RecordType, Value, ValueType};
