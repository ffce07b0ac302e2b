use crate::{
    catalog::{Catalog, Record},
    error::AccessError,
    value::{RecordType, Value},
};
use std::sync::Arc;

/// An optional record instance paired with the catalog of its type.
///
/// Writes go through dotted paths and create the instance (and any unset
/// intermediate record) on first use.
#[derive(Debug, Clone)]
pub struct Template<R> {
    catalog: Arc<Catalog>,
    instance: Option<R>,
}

impl<R: Record> Template<R> {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            instance: None,
        }
    }

    pub fn with_instance(catalog: Arc<Catalog>, instance: R) -> Self {
        Self {
            catalog,
            instance: Some(instance),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Creates the managed instance if there is none yet. Idempotent.
    pub fn instantiate(&mut self) -> Result<&mut Self, AccessError> {
        self.managed()?;
        Ok(self)
    }

    /// Replaces the managed instance.
    pub fn swap(&mut self, instance: R) -> &mut Self {
        self.instance = Some(instance);
        self
    }

    pub fn set_value(&mut self, path: &str, value: Value) -> Result<&mut Self, AccessError> {
        let catalog = Arc::clone(&self.catalog);
        catalog.set_value(self.managed()?, path, value)?;
        Ok(self)
    }

    /// Reads through a dotted path. Without a managed instance every path
    /// reads as unset.
    pub fn get_value(&self, path: &str) -> Result<Option<Value>, AccessError> {
        match &self.instance {
            Some(instance) => self.catalog.get_path(instance, path),
            None => Ok(None),
        }
    }

    pub fn instance(&self) -> Option<&R> {
        self.instance.as_ref()
    }

    /// The managed instance, created on the spot when none exists.
    pub fn into_instance(self) -> Result<R, AccessError> {
        match self.instance {
            Some(instance) => Ok(instance),
            None => create::<R>(),
        }
    }

    fn managed(&mut self) -> Result<&mut R, AccessError> {
        let instance = match self.instance.take() {
            Some(instance) => instance,
            None => create::<R>()?,
        };
        Ok(self.instance.insert(instance))
    }
}

fn create<R: Record>() -> Result<R, AccessError> {
    R::instantiate().ok_or_else(|| AccessError::Instantiation {
        record: RecordType::of::<R>().name().to_string(),
    })
}
