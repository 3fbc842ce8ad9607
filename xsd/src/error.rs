use dt_outline::ModelIntegrityError;
use thiserror::Error;

use super::xstypes::QName;

#[derive(Debug, Error)]
pub enum XsdError {
    #[error("failed to parse the schema document")]
    Xml(#[from] roxmltree::Error),
    #[error("expected a <schema> root element, found <{0}>")]
    NotASchema(String),
    #[error("failed to resolve prefix {0:?} to a namespace URI")]
    NamePrefixNotResolved(String),
    #[error("<{element}> is missing the {attribute:?} attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("invalid maxOccurs value {0:?}")]
    InvalidOccurs(String),
    #[error("{0} is declared more than once")]
    DuplicateDeclaration(QName),
    #[error("tried to overwrite built-in type {0}")]
    BuiltinOverwrite(QName),
    #[error("type {0} is not defined")]
    UnresolvedType(QName),
    #[error("element {0} is not defined")]
    UnresolvedElement(QName),
    #[error("attribute {0} is not defined")]
    UnresolvedAttribute(QName),
    #[error("simple type {0} is derived from itself")]
    CircularType(String),
    #[error(transparent)]
    Model(#[from] ModelIntegrityError),
}
