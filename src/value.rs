use crate::catalog::{Catalog, Record};
use crate::error::CatalogError;
use jiff::Timestamp;
use rust_decimal::Decimal;
use std::{
    any::{Any, TypeId},
    fmt,
};

/// Declared type of an accessor, and therefore the type a raw argument is
/// cast to before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Char,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    Timestamp,
    /// A nested record reachable through a dotted path.
    Record(RecordType),
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Text => "String",
            ValueType::Char => "char",
            ValueType::Bool => "bool",
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::Decimal => "Decimal",
            ValueType::Timestamp => "Timestamp",
            ValueType::Record(record) => record.name(),
        };
        f.write_str(name)
    }
}

/// Type-erased handle on a [`Record`] implementation: its name, how to build
/// its catalog and how to construct an empty instance of it.
#[derive(Clone, Copy)]
pub struct RecordType {
    name: &'static str,
    type_id: TypeId,
    instantiate: fn() -> Option<Box<dyn DynRecord>>,
    catalog: fn() -> Result<Catalog, CatalogError>,
}

impl RecordType {
    pub fn of<R: Record>() -> Self {
        Self {
            name: short_type_name::<R>(),
            type_id: TypeId::of::<R>(),
            instantiate: instantiate_boxed::<R>,
            catalog: Catalog::of::<R>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// A fresh instance, or `None` when the record has no no-argument
    /// construction.
    pub fn instantiate(&self) -> Option<Box<dyn DynRecord>> {
        (self.instantiate)()
    }

    /// Builds a new catalog for this record type.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        (self.catalog)()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for RecordType {}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.name).finish()
    }
}

fn instantiate_boxed<R: Record>() -> Option<Box<dyn DynRecord>> {
    R::instantiate().map(|record| Box::new(record) as Box<dyn DynRecord>)
}

// `a::b::Movie` -> `Movie`. Generic arguments are kept as-is.
fn short_type_name<R>() -> &'static str {
    let full = std::any::type_name::<R>();
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(at) => &full[at + 2..],
        None => full,
    }
}

/// A value read from, or about to be written to, an accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Char(char),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Record(Box<dyn DynRecord>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Text(_) => ValueType::Text,
            Value::Char(_) => ValueType::Char,
            Value::Bool(_) => ValueType::Bool,
            Value::I8(_) => ValueType::I8,
            Value::I16(_) => ValueType::I16,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::U8(_) => ValueType::U8,
            Value::U16(_) => ValueType::U16,
            Value::U32(_) => ValueType::U32,
            Value::U64(_) => ValueType::U64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::Decimal(_) => ValueType::Decimal,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Record(record) => ValueType::Record(record.record_type()),
        }
    }

    /// Downcasts a nested record value.
    pub fn as_record<R: Record>(&self) -> Option<&R> {
        match self {
            Value::Record(record) => record.as_any().downcast_ref::<R>(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(v) => f.write_str(v),
            Value::Char(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::Record(v) => write!(f, "{v:?}"),
        }
    }
}

/// Rust types that can sit behind a scalar accessor.
pub trait FieldValue: Sized + Send + Sync + 'static {
    fn value_type() -> ValueType;
    fn into_value(self) -> Value;
    /// Hands the value back when it is of another type.
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! scalar_field_values {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

scalar_field_values! {
    String => Text,
    char => Char,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    Timestamp => Timestamp,
}

/// Object-safe face of [`Record`], used wherever a nested record travels as
/// a [`Value`].
pub trait DynRecord: fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_record(&self) -> Box<dyn DynRecord>;
    fn eq_record(&self, other: &dyn DynRecord) -> bool;
    fn record_type(&self) -> RecordType;
}

impl<R: Record> DynRecord for R {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_record(&self) -> Box<dyn DynRecord> {
        Box::new(self.clone())
    }

    fn eq_record(&self, other: &dyn DynRecord) -> bool {
        other
            .as_any()
            .downcast_ref::<R>()
            .is_some_and(|other| other == self)
    }

    fn record_type(&self) -> RecordType {
        RecordType::of::<R>()
    }
}

impl Clone for Box<dyn DynRecord> {
    fn clone(&self) -> Self {
        self.clone_record()
    }
}

impl PartialEq for Box<dyn DynRecord> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_record(other.as_ref())
    }
}
