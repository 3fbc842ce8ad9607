use std::fmt;

use parking_lot::RwLock;
use tracing::trace;

use crate::derivation::{is_strict_derivation, DerivationGraph, InvalidSubstitutionError};
use crate::TypeDescriptor;

/// A value that knows its schema type at runtime.
pub trait TypedValue {
    fn type_descriptor(&self) -> TypeDescriptor;
}

/// Checked access from the declared shape to a derived shape `D`.
///
/// Generated element values are tagged unions over the declared type and its derivations; this is
/// implemented once per derived variant.
pub trait AsDerived<D> {
    fn as_derived(&self) -> Option<&D>;
}

/// Expanded name of an element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementName {
    pub namespace_name: Option<String>,
    pub local_name: String,
}

impl ElementName {
    pub fn new(namespace_name: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_name: namespace_name.map(Into::into),
            local_name: local_name.into(),
        }
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace_name) = self.namespace_name.as_ref() {
            write!(f, "{{{}}}:{}", namespace_name, self.local_name)
        } else {
            write!(f, "{}", self.local_name)
        }
    }
}

/// Scope of the element declaration an [`Element`] was created for. A local declaration knows the
/// type that contains it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    Local(TypeDescriptor),
}

impl Scope {
    /// `Some` if the scope is local, `None` otherwise
    pub fn parent(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Global => None,
            Self::Local(parent) => Some(parent),
        }
    }
}

/// An element value together with the type declared for the element.
///
/// The runtime type of the value may be a derivation of the declared type (type substitution, as
/// with `xsi:type` in an instance document). Whether that is the case is recorded when the value is
/// assigned; every assignment goes through [`Self::set_value()`] or [`Self::update()`], both of
/// which recompute it, so the flag can never be stale.
#[derive(Clone, Debug)]
pub struct Element<T> {
    name: ElementName,
    declared_type: TypeDescriptor,
    scope: Scope,
    value: T,
    nil: bool,
    substituted: bool,
}

impl<T: TypedValue> Element<T> {
    /// Wraps `value` for a global element declaration.
    pub fn wrap(
        graph: &(impl DerivationGraph + ?Sized),
        name: ElementName,
        declared_type: TypeDescriptor,
        value: T,
    ) -> Result<Self, InvalidSubstitutionError> {
        Self::wrap_in_scope(graph, name, declared_type, Scope::Global, value)
    }

    pub fn wrap_in_scope(
        graph: &(impl DerivationGraph + ?Sized),
        name: ElementName,
        declared_type: TypeDescriptor,
        scope: Scope,
        value: T,
    ) -> Result<Self, InvalidSubstitutionError> {
        let substituted = is_strict_derivation(graph, &value.type_descriptor(), &declared_type)?;
        trace!(element = %name, declared = %declared_type, substituted, "wrapped element value");
        Ok(Self {
            name,
            declared_type,
            scope,
            value,
            nil: false,
            substituted,
        })
    }

    /// Replaces the value and returns the previous one.
    ///
    /// If the new value's type is not a derivation of the declared type, the element is left
    /// unchanged and the new value is dropped.
    pub fn set_value(
        &mut self,
        graph: &(impl DerivationGraph + ?Sized),
        value: T,
    ) -> Result<T, InvalidSubstitutionError> {
        let substituted =
            is_strict_derivation(graph, &value.type_descriptor(), &self.declared_type)?;
        trace!(element = %self.name, substituted, "replaced element value");
        self.substituted = substituted;
        Ok(std::mem::replace(&mut self.value, value))
    }

    /// Modifies the value in place.
    ///
    /// `f` runs on a copy which is only committed if its type is still valid for the element, so a
    /// failed update leaves the element as it was.
    pub fn update<R>(
        &mut self,
        graph: &(impl DerivationGraph + ?Sized),
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, InvalidSubstitutionError>
    where
        T: Clone,
    {
        let mut value = self.value.clone();
        let result = f(&mut value);
        self.set_value(graph, value)?;
        Ok(result)
    }

    /// The type to announce when writing the value out (`xsi:type`); `None` unless the value was
    /// substituted.
    pub fn type_annotation(&self) -> Option<TypeDescriptor> {
        self.substituted.then(|| self.value.type_descriptor())
    }
}

impl<T> Element<T> {
    pub fn name(&self) -> &ElementName {
        &self.name
    }

    pub fn declared_type(&self) -> &TypeDescriptor {
        &self.declared_type
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_global_scope(&self) -> bool {
        self.scope == Scope::Global
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Whether the value's runtime type strictly derives from the declared type.
    pub fn is_type_substituted(&self) -> bool {
        self.substituted
    }

    pub fn is_nil(&self) -> bool {
        self.nil
    }

    pub fn set_nil(&mut self, nil: bool) {
        self.nil = nil;
    }

    /// The value as the derived shape `D`, if a substitution took place and the value has that
    /// shape.
    pub fn as_derived<D>(&self) -> Option<&D>
    where
        T: AsDerived<D>,
    {
        if self.substituted {
            self.value.as_derived()
        } else {
            None
        }
    }
}

/// An [`Element`] shared between threads.
///
/// Value and substitution flag live behind one lock and are always observed together.
#[derive(Debug)]
pub struct SharedElement<T> {
    inner: RwLock<Element<T>>,
}

impl<T: TypedValue> SharedElement<T> {
    pub fn new(element: Element<T>) -> Self {
        Self {
            inner: RwLock::new(element),
        }
    }

    pub fn set_value(
        &self,
        graph: &(impl DerivationGraph + ?Sized),
        value: T,
    ) -> Result<T, InvalidSubstitutionError> {
        self.inner.write().set_value(graph, value)
    }

    pub fn update<R>(
        &self,
        graph: &(impl DerivationGraph + ?Sized),
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, InvalidSubstitutionError>
    where
        T: Clone,
    {
        self.inner.write().update(graph, f)
    }

    /// The current value and its substitution flag, read under a single lock.
    pub fn snapshot(&self) -> (T, bool)
    where
        T: Clone,
    {
        let element = self.inner.read();
        (element.value().clone(), element.is_type_substituted())
    }

    pub fn read<R>(&self, f: impl FnOnce(&Element<T>) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn into_inner(self) -> Element<T> {
        self.inner.into_inner()
    }
}
