//! Runtime support shared by the binding compiler and the code it generates.
//!
//! [`TypeDescriptor`] names a generated type, [`DerivationGraph`] answers "is-a" questions between
//! schema types and [`Element`] carries an element value whose runtime type may be a derivation of
//! the type declared for the element.

pub mod derivation;
pub mod element;
mod type_descriptor;

pub use derivation::{BaseTypeTable, DerivationGraph, InvalidSubstitutionError};
pub use element::{AsDerived, Element, ElementName, Scope, SharedElement, TypedValue};
pub use type_descriptor::{TypeDescriptor, CORE_NAMESPACE};
