//! Accessor catalog for record types.
//!
//! A [`Record`] describes its readable and writable fields once, through
//! [`Fields`]. The resulting [`Catalog`] is type-erased so it can walk dotted
//! paths (`director.firstName`) across nested records of different types.


use crate::{
    error::{AccessError, CatalogError},
    value::{DynRecord, FieldValue, RecordType, Value, ValueType},
};
use hashbrown::HashMap;
use std::{any::Any, fmt, marker::PhantomData, sync::Arc};
use tracing::trace;

/// Separates the segments of a nested accessor path.
pub const PATH_SEPARATOR: char = '.';

/// A type whose fields can be targeted by comparison expressions.
///
/// ```
/// use fiql_bind::{Catalog, Fields, Record, ValueType};
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Actor {
///     name: Option<String>,
///     age: Option<u32>,
/// }
///
/// impl Record for Actor {
///     fn describe(fields: &mut Fields<Self>) {
///         fields
///             .property("name", |a| a.name.clone(), |a, v| a.name = Some(v))
///             .property("age", |a| a.age, |a, v| a.age = Some(v));
///     }
///
///     fn instantiate() -> Option<Self> {
///         Some(Self::default())
///     }
/// }
///
/// let catalog = Catalog::of::<Actor>().unwrap();
/// assert_eq!(catalog.resolve_type("age").unwrap(), ValueType::U32);
/// ```
pub trait Record: Any + Clone + PartialEq + fmt::Debug + Send + Sync {
    fn describe(fields: &mut Fields<Self>);

    /// Builds an empty instance. Records without a no-argument construction
    /// keep the default and can only be targeted through a seed instance.
    fn instantiate() -> Option<Self> {
        None
    }
}

type ReadFn = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
// On a type mismatch the writer reports the type it was handed.
type WriteFn = Arc<dyn Fn(&mut dyn Any, Value) -> Result<(), ValueType> + Send + Sync>;

#[derive(Clone)]
struct Getter {
    value_type: ValueType,
    read: ReadFn,
}

#[derive(Clone)]
struct Setter {
    value_type: ValueType,
    write: WriteFn,
}

/// Collects the accessors of a record type, in declaration order.
pub struct Fields<T> {
    getters: Vec<(&'static str, Getter)>,
    setters: Vec<(&'static str, Setter)>,
    _record: PhantomData<fn(T)>,
}

impl<T: Record> Fields<T> {
    fn new() -> Self {
        Self {
            getters: Vec::new(),
            setters: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Read-only accessor. `None` means the field is unset.
    pub fn getter<V: FieldValue>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> Option<V>,
    ) -> &mut Self {
        let read: ReadFn = Arc::new(move |instance: &dyn Any| {
            instance
                .downcast_ref::<T>()
                .and_then(get)
                .map(V::into_value)
        });
        self.getters.push((
            name,
            Getter {
                value_type: V::value_type(),
                read,
            },
        ));
        self
    }

    /// Write-only accessor.
    pub fn setter<V: FieldValue>(
        &mut self,
        name: &'static str,
        set: fn(&mut T, V),
    ) -> &mut Self {
        let write: WriteFn = Arc::new(move |instance: &mut dyn Any, value: Value| {
            let found = value.value_type();
            let Some(target) = instance.downcast_mut::<T>() else {
                return Err(found);
            };
            set(target, V::from_value(value).map_err(|_| found)?);
            Ok(())
        });
        self.setters.push((
            name,
            Setter {
                value_type: V::value_type(),
                write,
            },
        ));
        self
    }

    pub fn property<V: FieldValue>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> Option<V>,
        set: fn(&mut T, V),
    ) -> &mut Self {
        self.getter(name, get).setter(name, set)
    }

    /// Readable and writable field holding another record, reachable through
    /// dotted paths.
    pub fn nested<R: Record>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> Option<&R>,
        set: fn(&mut T, R),
    ) -> &mut Self {
        let value_type = ValueType::Record(RecordType::of::<R>());
        let read: ReadFn = Arc::new(move |instance: &dyn Any| {
            instance
                .downcast_ref::<T>()
                .and_then(get)
                .map(|nested| Value::Record(Box::new(nested.clone())))
        });
        let write: WriteFn = Arc::new(move |instance: &mut dyn Any, value: Value| {
            let found = value.value_type();
            let (Some(target), Value::Record(record)) = (instance.downcast_mut::<T>(), value)
            else {
                return Err(found);
            };
            let nested = record.into_any().downcast::<R>().map_err(|_| found)?;
            set(target, *nested);
            Ok(())
        });
        self.getters.push((name, Getter { value_type, read }));
        self.setters.push((name, Setter { value_type, write }));
        self
    }
}

/// Getter and setter tables of one record type.
///
/// Cheap to clone and safe to share between threads once built.
#[derive(Clone)]
pub struct Catalog {
    record: RecordType,
    getters: HashMap<&'static str, Getter>,
    setters: HashMap<&'static str, Setter>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("record", &self.record.name())
            .field("getters", &self.getter_names())
            .field("setters", &self.setter_names())
            .finish()
    }
}

impl Catalog {
    pub fn of<R: Record>() -> Result<Self, CatalogError> {
        let mut fields = Fields::<R>::new();
        R::describe(&mut fields);
        Self::from_fields(RecordType::of::<R>(), fields)
    }

    /// Catalog of the runtime type behind `instance`.
    pub fn of_instance(instance: &dyn DynRecord) -> Result<Self, CatalogError> {
        instance.record_type().catalog()
    }

    fn from_fields<R: Record>(
        record: RecordType,
        fields: Fields<R>,
    ) -> Result<Self, CatalogError> {
        let Fields {
            getters, setters, ..
        } = fields;
        let getters: HashMap<_, _> = getters.into_iter().collect();
        let setters: HashMap<_, _> = setters.into_iter().collect();

        let mut names: Vec<_> = getters.keys().copied().collect();
        names.sort_unstable();
        for name in names {
            if let (Some(getter), Some(setter)) = (getters.get(name), setters.get(name)) {
                if getter.value_type != setter.value_type {
                    return Err(CatalogError::AccessorTypeMismatch {
                        record: record.name().to_string(),
                        accessor: name.to_string(),
                        getter: getter.value_type.to_string(),
                        setter: setter.value_type.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            record,
            getters,
            setters,
        })
    }

    pub fn record(&self) -> RecordType {
        self.record
    }

    /// Readable accessor names, sorted.
    pub fn getter_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.getters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Writable accessor names, sorted.
    pub fn setter_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.setters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Declared type at the end of a dotted path. Single segments prefer the
    /// getter and fall back to the setter.
    pub fn resolve_type(&self, path: &str) -> Result<ValueType, AccessError> {
        self.resolve_segments(&split_path(path)?)
    }

    fn resolve_segments(&self, segments: &[&str]) -> Result<ValueType, AccessError> {
        let Some((first, rest)) = segments.split_first() else {
            return Err(AccessError::MalformedPath {
                path: String::new(),
            });
        };
        let value_type = self.accessor_type(first)?;
        if rest.is_empty() {
            return Ok(value_type);
        }
        nested_record(value_type, rest[0])?
            .catalog()?
            .resolve_segments(rest)
    }

    /// Reads a single accessor. `Ok(None)` means the field is unset.
    pub fn get_value(
        &self,
        instance: &dyn Any,
        name: &str,
    ) -> Result<Option<Value>, AccessError> {
        self.check_instance(instance)?;
        match self.getters.get(name) {
            Some(getter) => Ok((getter.read)(instance)),
            None => Err(self.unknown(name)),
        }
    }

    /// Reads through a dotted path. An unset intermediate yields `Ok(None)`.
    pub fn get_path(
        &self,
        instance: &dyn Any,
        path: &str,
    ) -> Result<Option<Value>, AccessError> {
        let segments = split_path(path)?;
        self.get_segments(instance, &segments)
    }

    fn get_segments(
        &self,
        instance: &dyn Any,
        segments: &[&str],
    ) -> Result<Option<Value>, AccessError> {
        let Some((first, rest)) = segments.split_first() else {
            return Err(AccessError::MalformedPath {
                path: String::new(),
            });
        };
        let value = self.get_value(instance, first)?;
        if rest.is_empty() {
            return Ok(value);
        }
        match value {
            Some(Value::Record(nested)) => nested
                .record_type()
                .catalog()?
                .get_segments(nested.as_any(), rest),
            Some(scalar) => Err(not_a_record(scalar.value_type(), rest[0])),
            None => Ok(None),
        }
    }

    /// Writes `value` at the end of a dotted path. Unset intermediate records
    /// are instantiated on the way down and written back once the nested write
    /// succeeded, so a failing write leaves `instance` untouched.
    pub fn set_value(
        &self,
        instance: &mut dyn Any,
        path: &str,
        value: Value,
    ) -> Result<(), AccessError> {
        self.check_instance(instance)?;
        let segments = split_path(path)?;
        self.set_segments(instance, &segments, value)
    }

    fn set_segments(
        &self,
        instance: &mut dyn Any,
        segments: &[&str],
        value: Value,
    ) -> Result<(), AccessError> {
        let Some((first, rest)) = segments.split_first() else {
            return Err(AccessError::MalformedPath {
                path: String::new(),
            });
        };
        if rest.is_empty() {
            return self.write(instance, first, value);
        }

        let record = nested_record(self.accessor_type(first)?, rest[0])?;
        let current = self
            .getters
            .get(*first)
            .and_then(|getter| (getter.read)(&*instance));
        let mut nested = match current {
            Some(Value::Record(nested)) => nested,
            _ => {
                trace!(
                    record = record.name(),
                    accessor = *first,
                    "instantiating intermediate record"
                );
                record.instantiate().ok_or_else(|| AccessError::Instantiation {
                    record: record.name().to_string(),
                })?
            }
        };
        record
            .catalog()?
            .set_segments(nested.as_any_mut(), rest, value)?;
        self.write(instance, first, Value::Record(nested))
    }

    fn write(
        &self,
        instance: &mut dyn Any,
        name: &str,
        value: Value,
    ) -> Result<(), AccessError> {
        let Some(setter) = self.setters.get(name) else {
            return Err(self.unknown(name));
        };
        (setter.write)(instance, value).map_err(|found| AccessError::ValueMismatch {
            accessor: name.to_string(),
            expected: setter.value_type.to_string(),
            found: found.to_string(),
        })
    }

    fn accessor_type(&self, name: &str) -> Result<ValueType, AccessError> {
        self.getters
            .get(name)
            .map(|getter| getter.value_type)
            .or_else(|| self.setters.get(name).map(|setter| setter.value_type))
            .ok_or_else(|| self.unknown(name))
    }

    fn check_instance(&self, instance: &dyn Any) -> Result<(), AccessError> {
        if Any::type_id(instance) == self.record.type_id() {
            Ok(())
        } else {
            Err(AccessError::ForeignInstance {
                expected: self.record.name().to_string(),
            })
        }
    }

    fn unknown(&self, name: &str) -> AccessError {
        AccessError::UnknownAccessor {
            record: self.record.name().to_string(),
            accessor: name.to_string(),
            getters: self.getter_names().into_iter().map(String::from).collect(),
            setters: self.setter_names().into_iter().map(String::from).collect(),
        }
    }
}

fn nested_record(value_type: ValueType, next: &str) -> Result<RecordType, AccessError> {
    match value_type {
        ValueType::Record(record) => Ok(record),
        scalar => Err(not_a_record(scalar, next)),
    }
}

// A scalar has no accessors, so descending into one reports the next segment
// as unknown on it.
fn not_a_record(scalar: ValueType, next: &str) -> AccessError {
    AccessError::UnknownAccessor {
        record: scalar.to_string(),
        accessor: next.to_string(),
        getters: Vec::new(),
        setters: Vec::new(),
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, AccessError> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(AccessError::MalformedPath {
            path: path.to_string(),
        });
    }
    Ok(segments)
}
