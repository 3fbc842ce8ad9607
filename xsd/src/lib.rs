//! Binds a subset of XML Schema to an [`Outline`].
//!
//! Named complex types and global elements with anonymous complex types become top-level classes of
//! a single package; anonymous complex types of local elements become nested classes. Particles
//! are flattened into fields, derivations into supertypes, and simple types bind to the type their
//! built-in root binds to.

pub mod builtins;
pub mod error;
pub mod xstypes;

mod mapping_context;
mod naming;

use std::borrow::Cow;

use dt_outline::Outline;
use encoding_rs::{Encoding, UTF_8};
use roxmltree::{Document, ParsingOptions};

pub use error::XsdError;
pub use naming::namespace_to_package;

use builtins::XS_NAMESPACE;
use mapping_context::MappingContext;

/// Package of the classes of a schema without target namespace.
pub const DEFAULT_PACKAGE: &str = "generated";

/// What to do when a schema declares a type with the name of a built-in datatype.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BuiltinOverwriteAction {
    #[default]
    Deny,
    Warn,
    Allow,
}

#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    /// Overrides the package derived from the target namespace
    pub package: Option<String>,
    pub builtin_overwrite: BuiltinOverwriteAction,
}

/// Decodes a schema file, honouring a byte order mark and defaulting to UTF-8.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _encoding, _had_errors) = Encoding::decode(UTF_8, bytes);
    text
}

pub fn parse_document(text: &str, allow_dtd: bool) -> Result<Document<'_>, XsdError> {
    let options = ParsingOptions {
        allow_dtd,
        ..ParsingOptions::default()
    };
    Ok(Document::parse_with_options(text, options)?)
}

/// Binds the schema rooted at `document` to an outline.
pub fn read_outline(document: &Document, options: &ReadOptions) -> Result<Outline, XsdError> {
    let schema = document.root_element();
    let tag_name = schema.tag_name();
    if tag_name.namespace() != Some(XS_NAMESPACE) || tag_name.name() != "schema" {
        return Err(XsdError::NotASchema(tag_name.name().to_owned()));
    }
    MappingContext::map_schema(schema, options)
}

/// Shorthand for [`parse_document()`] followed by [`read_outline()`], without DTD support.
pub fn read_outline_from_str(text: &str, options: &ReadOptions) -> Result<Outline, XsdError> {
    let document = parse_document(text, false)?;
    read_outline(&document, options)
}

#[cfg(test)]
mod tests {
    use dt_outline::signature::{self, SignatureOptions};

    use super::*;

    fn signature_of(schema: &str) -> String {
        let outline = read_outline_from_str(schema, &ReadOptions::default()).unwrap();
        signature::to_string(&outline, &SignatureOptions::default())
    }

    fn schema(target_namespace: &str, body: &str) -> String {
        format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:t="{target_namespace}" targetNamespace="{target_namespace}">{body}</xs:schema>"#
        )
    }

    #[test]
    fn complex_types_and_extension() {
        let text = schema(
            "urn:p",
            r#"
            <xs:complexType name="a">
              <xs:sequence><xs:element name="x" type="xs:int"/></xs:sequence>
            </xs:complexType>
            <xs:complexType name="b">
              <xs:complexContent>
                <xs:extension base="t:a">
                  <xs:sequence><xs:element name="y" type="xs:string"/></xs:sequence>
                </xs:extension>
              </xs:complexContent>
            </xs:complexType>
            "#,
        );
        assert_eq!(
            signature_of(&text),
            "package p {\n  interface A {\n    int x;\n  }\n  interface B extends A {\n    String y;\n  }\n}\n"
        );
    }

    #[test]
    fn forward_references_and_repetition() {
        let text = schema(
            "urn:p",
            r#"
            <xs:element name="order">
              <xs:complexType>
                <xs:sequence>
                  <xs:element name="line" type="t:Line" maxOccurs="unbounded"/>
                  <xs:element ref="t:note" minOccurs="0"/>
                </xs:sequence>
                <xs:attribute name="orderDate" type="xs:date"/>
              </xs:complexType>
            </xs:element>
            <xs:element name="note" type="xs:string"/>
            <xs:complexType name="Line">
              <xs:sequence maxOccurs="2">
                <xs:element name="sku" type="t:Sku"/>
              </xs:sequence>
            </xs:complexType>
            <xs:simpleType name="Sku">
              <xs:restriction base="xs:token"><xs:pattern value="\d{3}-[A-Z]{2}"/></xs:restriction>
            </xs:simpleType>
            "#,
        );
        assert_eq!(
            signature_of(&text),
            "package p {\n  interface Order {\n    List<p.Line> line;\n    String note;\n    Calendar orderDate;\n  }\n  interface Line {\n    List<String> sku;\n  }\n}\n"
        );
    }

    #[test]
    fn simple_content() {
        let text = schema(
            "urn:p",
            r#"
            <xs:complexType name="Price">
              <xs:simpleContent>
                <xs:extension base="xs:decimal">
                  <xs:attribute name="currency" type="xs:string" use="required"/>
                </xs:extension>
              </xs:simpleContent>
            </xs:complexType>
            <xs:complexType name="Discount">
              <xs:simpleContent>
                <xs:extension base="t:Price"/>
              </xs:simpleContent>
            </xs:complexType>
            "#,
        );
        assert_eq!(
            signature_of(&text),
            "package p {\n  interface Price {\n    BigDecimal value;\n    String currency;\n  }\n  interface Discount extends Price {\n  }\n}\n"
        );
    }

    #[test]
    fn lists_and_unions() {
        let text = schema(
            "urn:p",
            r#"
            <xs:simpleType name="Sizes"><xs:list itemType="xs:int"/></xs:simpleType>
            <xs:complexType name="A">
              <xs:sequence>
                <xs:element name="sizes" type="t:Sizes"/>
                <xs:element name="either">
                  <xs:simpleType><xs:union memberTypes="xs:int xs:date"/></xs:simpleType>
                </xs:element>
                <xs:element name="anything"/>
              </xs:sequence>
            </xs:complexType>
            "#,
        );
        assert_eq!(
            signature_of(&text),
            "package p {\n  interface A {\n    List<int> sizes;\n    String either;\n    Object anything;\n  }\n}\n"
        );
    }

    #[test]
    fn package_option_and_default_package() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="A"/>
        </xs:schema>"#;
        let outline = read_outline_from_str(text, &ReadOptions::default()).unwrap();
        assert!(outline.class_by_name("generated", "A").is_some());

        let options = ReadOptions {
            package: Some("org.acme".into()),
            ..ReadOptions::default()
        };
        let outline = read_outline_from_str(text, &options).unwrap();
        assert!(outline.class_by_name("org.acme", "A").is_some());
    }

    #[test]
    fn builtin_overwrite() {
        let text = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                targetNamespace="http://www.w3.org/2001/XMLSchema">
            <xs:simpleType name="string"><xs:restriction base="xs:int"/></xs:simpleType>
        </xs:schema>"#;
        assert!(matches!(
            read_outline_from_str(text, &ReadOptions::default()),
            Err(XsdError::BuiltinOverwrite(_))
        ));

        let options = ReadOptions {
            builtin_overwrite: BuiltinOverwriteAction::Allow,
            ..ReadOptions::default()
        };
        assert!(read_outline_from_str(text, &options).is_ok());
    }

    #[test]
    fn errors() {
        let unresolved = schema(
            "urn:p",
            r#"<xs:complexType name="A"><xs:sequence><xs:element name="b" type="t:B"/></xs:sequence></xs:complexType>"#,
        );
        assert!(matches!(
            read_outline_from_str(&unresolved, &ReadOptions::default()),
            Err(XsdError::UnresolvedType(name)) if name.local_name == "B"
        ));

        let circular = schema(
            "urn:p",
            r#"<xs:simpleType name="S"><xs:restriction base="t:S"/></xs:simpleType>
            <xs:complexType name="A"><xs:attribute name="s" type="t:S"/></xs:complexType>"#,
        );
        assert!(matches!(
            read_outline_from_str(&circular, &ReadOptions::default()),
            Err(XsdError::CircularType(name)) if name == "S"
        ));

        let duplicate_field = schema(
            "urn:p",
            r#"<xs:complexType name="A"><xs:sequence>
                <xs:element name="b" type="xs:int"/>
                <xs:element name="b" type="xs:int"/>
            </xs:sequence></xs:complexType>"#,
        );
        assert!(matches!(
            read_outline_from_str(&duplicate_field, &ReadOptions::default()),
            Err(XsdError::Model(_))
        ));

        assert!(matches!(
            read_outline_from_str("<root/>", &ReadOptions::default()),
            Err(XsdError::NotASchema(name)) if name == "root"
        ));
        assert!(matches!(
            read_outline_from_str("<xs:schema", &ReadOptions::default()),
            Err(XsdError::Xml(_))
        ));
    }

    #[test]
    fn decode_strips_byte_order_mark() {
        assert_eq!(decode(b"\xEF\xBB\xBF<a/>"), "<a/>");
        assert_eq!(decode(b"\xFF\xFE<\0a\0/\0>\0"), "<a/>");
    }
}
