use fiql_syntax::{ParseError, RegistryError};
use thiserror::Error;

/// Raised while building a [`Catalog`](crate::Catalog) for a record type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error(
        "accessor '{accessor}' of {record} has a getter of type {getter} but a setter of type {setter}"
    )]
    AccessorTypeMismatch {
        record: String,
        accessor: String,
        getter: String,
        setter: String,
    },
}

/// Raised while reading or writing accessors on a record instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    #[error(
        "accessor '{accessor}' not found on {record}, known setters are: {setters:?}, known getters are: {getters:?}"
    )]
    UnknownAccessor {
        record: String,
        accessor: String,
        getters: Vec<String>,
        setters: Vec<String>,
    },
    #[error("malformed accessor path: {path:?}")]
    MalformedPath { path: String },
    #[error("{record} cannot be instantiated without arguments")]
    Instantiation { record: String },
    #[error("instance is not a {expected}")]
    ForeignInstance { expected: String },
    #[error("accessor '{accessor}' expects a value of type {expected}, got {found}")]
    ValueMismatch {
        accessor: String,
        expected: String,
        found: String,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Raised when a raw comparison argument cannot be turned into the type of
/// its accessor.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("cannot read {raw:?} as a timestamp ({strict}) or as a duration from now ({duration})")]
    Date {
        raw: String,
        strict: jiff::Error,
        duration: jiff::Error,
    },
    #[error("cannot read {raw:?} as a decimal number")]
    Numeric {
        raw: String,
        #[source]
        source: rust_decimal::Error,
    },
    #[error("cannot convert {raw:?} to {target}")]
    Primitive { raw: String, target: String },
}

/// Everything that can go wrong between a raw expression and a bound result.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Cast(#[from] CastError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl QueryError {
    /// Configuration problems are bugs in the record model or the operator
    /// setup, as opposed to bad user input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            QueryError::Catalog(_)
                | QueryError::Registry(_)
                | QueryError::Access(AccessError::Catalog(_))
        )
    }
}
