//! The outline is the binding compiler's model of the types it generates for a schema: packages,
//! classes, their fields and their supertypes.
//!
//! Outlines are assembled with an [`OutlineBuilder`] and are immutable afterwards. The
//! [`signature`] module renders an outline into a stable textual form that is compared across
//! compiler versions to detect unintended changes to the generated types.

pub mod builder;
pub mod components;
pub mod error;
pub mod outline;
pub mod signature;

mod model;

pub use builder::OutlineBuilder;
pub use components::{ComponentTable, Ref};
pub use error::{ModelIntegrityError, SignatureError};
pub use model::{ClassDescriptor, FieldDescriptor, PackageContainer};
pub use outline::Outline;
pub use signature::SignatureOptions;

pub use dt_builtins::TypeDescriptor;
