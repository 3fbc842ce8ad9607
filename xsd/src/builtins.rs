//! Bindings of the built-in datatypes (XSD 1.1 pt. 2, §3).
//!
//! Primitive bindings use the unqualified names `boolean`, `int`, ...; everything else binds to a
//! type of the `core` package.

use std::collections::HashMap;

use dt_builtins::TypeDescriptor;
use lazy_static::lazy_static;

use super::xstypes::QName;

// XSD 1.1 pt. 1, §1.3.1
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

lazy_static! {
    /// The `xs:anyType` qualified name
    pub static ref XS_ANY_TYPE_NAME: QName = QName::with_namespace(XS_NAMESPACE, "anyType");

    static ref BUILTIN_BINDINGS: HashMap<&'static str, TypeDescriptor> = {
        let mut bindings = HashMap::new();

        for (name, primitive) in [
            ("boolean", "boolean"),
            ("float", "float"),
            ("double", "double"),
            ("long", "long"),
            ("int", "int"),
            ("short", "short"),
            ("byte", "byte"),
            // Unsigned types widen to the next signed type
            ("unsignedByte", "short"),
            ("unsignedShort", "int"),
            ("unsignedInt", "long"),
        ] {
            bindings.insert(name, TypeDescriptor::primitive(primitive));
        }

        for (names, core) in [
            (
                &[
                    "anySimpleType", "anyAtomicType", "string", "normalizedString", "token",
                    "language", "Name", "NCName", "NMTOKEN", "ID", "IDREF", "ENTITY", "anyURI",
                ][..],
                "String",
            ),
            (&["decimal"][..], "BigDecimal"),
            (
                &[
                    "integer", "nonNegativeInteger", "positiveInteger", "nonPositiveInteger",
                    "negativeInteger", "unsignedLong",
                ][..],
                "BigInteger",
            ),
            (
                &[
                    "dateTime", "dateTimeStamp", "date", "time", "gYearMonth", "gYear",
                    "gMonthDay", "gDay", "gMonth",
                ][..],
                "Calendar",
            ),
            (
                &["duration", "yearMonthDuration", "dayTimeDuration"][..],
                "Duration",
            ),
            (&["base64Binary", "hexBinary"][..], "Bytes"),
            (&["QName", "NOTATION"][..], "QName"),
            (&["anyType"][..], "Object"),
        ] {
            for name in names {
                bindings.insert(*name, TypeDescriptor::core(core));
            }
        }

        // Built-in list types
        for name in ["IDREFS", "NMTOKENS", "ENTITIES"] {
            bindings.insert(name, TypeDescriptor::list_of(TypeDescriptor::core("String")));
        }

        bindings
    };
}

/// Whether `name` is the name of a built-in datatype.
pub fn is_builtin_name(name: &QName) -> bool {
    name.is_in_namespace(Some(XS_NAMESPACE))
        && BUILTIN_BINDINGS.contains_key(name.local_name.as_str())
}

/// The binding of the built-in datatype `name`, if there is one.
pub fn builtin_type(name: &QName) -> Option<TypeDescriptor> {
    if !name.is_in_namespace(Some(XS_NAMESPACE)) {
        return None;
    }
    BUILTIN_BINDINGS.get(name.local_name.as_str()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xs(local_name: &str) -> Option<TypeDescriptor> {
        builtin_type(&QName::with_namespace(XS_NAMESPACE, local_name))
    }

    #[test]
    fn primitive_and_core_bindings() {
        assert_eq!(xs("int"), Some(TypeDescriptor::primitive("int")));
        assert_eq!(xs("unsignedInt"), Some(TypeDescriptor::primitive("long")));
        assert_eq!(xs("token"), Some(TypeDescriptor::core("String")));
        assert_eq!(xs("positiveInteger"), Some(TypeDescriptor::core("BigInteger")));
        assert_eq!(xs("date"), Some(TypeDescriptor::core("Calendar")));
        assert_eq!(xs("anyType"), Some(TypeDescriptor::core("Object")));
        assert_eq!(
            xs("NMTOKENS"),
            Some(TypeDescriptor::list_of(TypeDescriptor::core("String")))
        );
        assert_eq!(xs("foo"), None);
    }

    #[test]
    fn names_outside_the_xs_namespace_are_not_builtin() {
        let name = QName::with_namespace("urn:other", "string");
        assert!(!is_builtin_name(&name));
        assert_eq!(builtin_type(&name), None);
        assert!(is_builtin_name(&XS_ANY_TYPE_NAME));
    }
}
