use heck::{ToLowerCamelCase, ToPascalCase};

/// Names that cannot be used as a class or field name unchanged.
const RESERVED_NAMES: &[&str] = &[
    "abstract", "boolean", "byte", "class", "default", "double", "enum", "extends", "final",
    "float", "implements", "import", "int", "interface", "long", "new", "package", "private",
    "public", "short", "static", "super", "this", "void",
];

/// Derives a package name from a target namespace.
///
/// `http://www.example.com/ipo` becomes `com.example.ipo`, `urn:a:b` becomes `a.b`.
pub fn namespace_to_package(namespace: &str) -> String {
    let mut segments: Vec<String> = Vec::new();

    if let Some(rest) = namespace.strip_prefix("urn:") {
        segments.extend(rest.split(':').map(str::to_owned));
    } else {
        let rest = namespace
            .split_once("://")
            .map_or(namespace, |(_scheme, rest)| rest);
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = host.split(':').next().unwrap_or(host);
        let host = host.strip_prefix("www.").unwrap_or(host);
        segments.extend(host.rsplit('.').map(str::to_owned));
        segments.extend(
            path.trim_end_matches(".xsd")
                .split(['/', '.'])
                .map(str::to_owned),
        );
    }

    segments
        .iter()
        .map(|segment| package_segment(segment))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

fn package_segment(segment: &str) -> String {
    let segment: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let segment = segment.trim_matches('_');
    escape(segment.to_owned())
}

pub fn class_name(local_name: &str) -> String {
    escape(local_name.to_pascal_case())
}

pub fn field_name(local_name: &str) -> String {
    escape(local_name.to_lower_camel_case())
}

fn escape(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else if RESERVED_NAMES.contains(&name.as_str()) {
        name + "_"
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packages_from_namespaces() {
        assert_eq!(namespace_to_package("http://www.example.com/ipo"), "com.example.ipo");
        assert_eq!(namespace_to_package("urn:a:b"), "a.b");
        assert_eq!(
            namespace_to_package("https://schemas.example.org:8080/v1/Order-Types.xsd"),
            "org.example.schemas.v1.order_types"
        );
        assert_eq!(namespace_to_package("http://example.com/"), "com.example");
        assert_eq!(namespace_to_package("urn:x:2024"), "x._2024");
        assert_eq!(namespace_to_package("urn:example:class"), "example.class_");
    }

    #[test]
    fn class_and_field_names() {
        assert_eq!(class_name("purchaseOrder"), "PurchaseOrder");
        assert_eq!(class_name("USAddress"), "UsAddress");
        assert_eq!(class_name("item"), "Item");
        assert_eq!(field_name("USPrice"), "usPrice");
        assert_eq!(field_name("ship-date"), "shipDate");
        assert_eq!(field_name("partNum"), "partNum");
        assert_eq!(field_name("class"), "class_");
        assert_eq!(field_name("default"), "default_");
    }
}
