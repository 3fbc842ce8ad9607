use std::io;

use thiserror::Error;

/// The outline handed to the builder violates one of its structural invariants.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModelIntegrityError {
    #[error("duplicate field {field:?} in class {class}")]
    DuplicateField { class: String, field: String },
    #[error("class {0} is defined more than once")]
    DuplicateClass(String),
    #[error("class {0} is reserved but never defined")]
    UndefinedClass(String),
    #[error("class {0} is part of a supertype cycle")]
    SupertypeCycle(String),
    #[error("class {0} is nested within itself")]
    NestingCycle(String),
    #[error(
        "nested class {class} is in package {package:?}, \
        but its enclosing class is in package {enclosing_package:?}"
    )]
    PackageMismatch {
        class: String,
        package: String,
        enclosing_package: String,
    },
}

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("failed to write the signature")]
    Io(#[from] io::Error),
}
