use std::fmt;

use super::error::XsdError;

/// An expanded name: namespace name and local name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace_name: Option<String>,
    pub local_name: String,
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace_name) = self.namespace_name.as_ref() {
            write!(f, "{{{}}}:{}", namespace_name, self.local_name)
        } else {
            write!(f, "{}", self.local_name)
        }
    }
}

impl QName {
    pub fn with_namespace(
        namespace_name: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self::with_optional_namespace(Some(namespace_name), local_name)
    }

    pub fn with_optional_namespace(
        namespace_name: Option<impl Into<String>>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace_name: namespace_name.map(Into::into),
            local_name: local_name.into(),
        }
    }

    pub fn is_in_namespace(&self, namespace_name: Option<&str>) -> bool {
        self.namespace_name.as_deref() == namespace_name
    }

    /// Parses a `prefix:local` or `local` reference as it appears in a `type`, `base` or `ref`
    /// attribute, resolving the prefix against the namespace declarations in scope at `context`.
    ///
    /// An unprefixed name takes the default namespace, if one is declared (Namespaces in XML 1.0,
    /// §6.2).
    pub fn parse(source: &str, context: roxmltree::Node) -> Result<Self, XsdError> {
        let source = source.trim();
        match source.split_once(':') {
            Some(("xml", local)) => {
                // Bound by definition (Namespaces in XML 1.0, §3)
                Ok(Self::with_namespace(
                    "http://www.w3.org/XML/1998/namespace",
                    local,
                ))
            }
            Some((prefix, local)) => {
                let namespace_name = context
                    .lookup_namespace_uri(Some(prefix))
                    .ok_or_else(|| XsdError::NamePrefixNotResolved(prefix.into()))?;
                Ok(Self::with_namespace(namespace_name, local))
            }
            None => Ok(Self::with_optional_namespace(
                context.lookup_namespace_uri(None),
                source,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_resolves_prefixes() {
        let xml = r#"<a xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:default"/>"#;
        let document = roxmltree::Document::parse(xml).unwrap();
        let node = document.root_element();

        assert_eq!(
            QName::parse("xs:string", node).unwrap(),
            QName::with_namespace("http://www.w3.org/2001/XMLSchema", "string")
        );
        assert_eq!(
            QName::parse("Local", node).unwrap(),
            QName::with_namespace("urn:default", "Local")
        );
        assert_eq!(
            QName::parse("xml:lang", node).unwrap().to_string(),
            "{http://www.w3.org/XML/1998/namespace}:lang"
        );
        assert!(matches!(
            QName::parse("nope:x", node),
            Err(XsdError::NamePrefixNotResolved(prefix)) if prefix == "nope"
        ));
    }
}
