use crate::{
    cast::cast,
    catalog::{Catalog, Record},
    error::QueryError,
    predicate::{Predicate, materialize},
    template::Template,
    value::Value,
};
use fiql_syntax::{Comparison, ConditionKind, Expr, Operators, parse_expression};
use std::{fmt, sync::Arc};
use tracing::{debug, trace};

/// A comparison bound to an accessor of the target record, its argument cast
/// to the accessor's declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub path: String,
    pub operator: String,
    pub kind: ConditionKind,
    pub value: Value,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.path,
            self.operator,
            self.value,
            self.value.value_type()
        )
    }
}

/// Compiles FIQL expressions against the record type `R`.
///
/// The parser keeps its own snapshot of the operator table, so a registry
/// mutated afterwards does not affect it. One parser can serve any number of
/// parses, concurrently if needed.
///
/// ```
/// use fiql_bind::{Fields, Operators, Parser, Record};
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Film {
///     title: Option<String>,
///     year: Option<i32>,
/// }
///
/// impl Record for Film {
///     fn describe(fields: &mut Fields<Self>) {
///         fields
///             .property("title", |f| f.title.clone(), |f, v| f.title = Some(v))
///             .property("year", |f| f.year, |f, v| f.year = Some(v));
///     }
///
///     fn instantiate() -> Option<Self> {
///         Some(Self::default())
///     }
/// }
///
/// let parser = Parser::<Film>::new(&Operators::new()).unwrap();
/// let film = parser.populate("title==Alien;year=ge=1979").unwrap();
/// assert_eq!(film.title.as_deref(), Some("Alien"));
/// assert_eq!(film.year, Some(1979));
/// ```
#[derive(Debug, Clone)]
pub struct Parser<R> {
    operators: Operators,
    catalog: Arc<Catalog>,
    seed: Option<R>,
}

impl<R: Record> Parser<R> {
    pub fn new(operators: &Operators) -> Result<Self, QueryError> {
        Ok(Self {
            operators: operators.clone(),
            catalog: Arc::new(Catalog::of::<R>()?),
            seed: None,
        })
    }

    /// Parser whose results start from a copy of `seed` instead of a fresh
    /// instance. Required for records without a no-argument construction.
    pub fn for_instance(operators: &Operators, seed: R) -> Result<Self, QueryError> {
        let mut parser = Self::new(operators)?;
        parser.seed = Some(seed);
        Ok(parser)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn operators(&self) -> &Operators {
        &self.operators
    }

    /// Parses `input` and binds every comparison: the selector must name an
    /// accessor of `R` and the argument must cast to its type.
    pub fn expression(&self, input: &str) -> Result<Expr<Constraint>, QueryError> {
        debug!(input, "parsing expression");
        let expr = parse_expression(input, &self.operators)?;
        expr.try_map_leaves(&mut |comparison| self.bind(comparison))
    }

    fn bind(&self, comparison: Comparison) -> Result<Constraint, QueryError> {
        let Comparison {
            selector,
            operator,
            kind,
            argument,
        } = comparison;
        let value_type = self.catalog.resolve_type(&selector)?;
        let value = cast(&value_type, &argument)?;
        trace!(path = selector.as_str(), %kind, %value_type, "bound comparison");
        Ok(Constraint {
            path: selector,
            operator,
            kind,
            value,
        })
    }

    /// Parses `input` into a tree of populated templates.
    pub fn parse(&self, input: &str) -> Result<Predicate<R>, QueryError> {
        let expr = self.expression(input)?;
        Ok(materialize(&self.template(), &expr)?)
    }

    /// Applies every comparison of `input`, in textual order, onto a single
    /// instance and returns it. Structure and kinds are discarded; a path
    /// named twice keeps its last value.
    pub fn populate(&self, input: &str) -> Result<R, QueryError> {
        let expr = self.expression(input)?;
        let mut template = self.template();
        for constraint in expr.leaves() {
            template.set_value(&constraint.path, constraint.value.clone())?;
        }
        Ok(template.into_instance()?)
    }

    /// Reads a dotted path from `record`.
    pub fn read(&self, record: &R, path: &str) -> Result<Option<Value>, QueryError> {
        Ok(self.catalog.get_path(record, path)?)
    }

    fn template(&self) -> Template<R> {
        let catalog = Arc::clone(&self.catalog);
        match &self.seed {
            Some(seed) => Template::with_instance(catalog, seed.clone()),
            None => Template::new(catalog),
        }
    }
}
