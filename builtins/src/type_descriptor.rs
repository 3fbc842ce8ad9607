use std::fmt;

/// Namespace of the built-in reference types (`core.String`, `core.List`, ...)
pub const CORE_NAMESPACE: &str = "core";

/// The type of a generated field or of a runtime element value.
///
/// A descriptor without a package is a primitive (`int`, `boolean`). A descriptor with arguments
/// is parametric, e.g. `core.List<com.example.ipo.Item>`.
///
/// Identity is the fully qualified name. How a descriptor is *presented* (see
/// [`Self::display_name()`]) never takes part in equality or hashing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor {
    package: Option<String>,
    name: String,
    arguments: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            package: None,
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// A reference type. For nested classes `name` contains the enclosing class names separated
    /// by dots (`Outer.Inner`).
    pub fn reference(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: Some(package.into()),
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn parametric(
        package: impl Into<String>,
        name: impl Into<String>,
        arguments: Vec<TypeDescriptor>,
    ) -> Self {
        Self {
            package: Some(package.into()),
            name: name.into(),
            arguments,
        }
    }

    /// Shorthand for a reference into the [core namespace](CORE_NAMESPACE).
    pub fn core(name: impl Into<String>) -> Self {
        Self::reference(CORE_NAMESPACE, name)
    }

    /// `core.List<item>`, used for repeated particles and list simple types.
    pub fn list_of(item: TypeDescriptor) -> Self {
        Self::parametric(CORE_NAMESPACE, "List", vec![item])
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// The name without the package (but including enclosing class names).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[TypeDescriptor] {
        &self.arguments
    }

    pub fn is_primitive(&self) -> bool {
        self.package.is_none()
    }

    pub fn is_parametric(&self) -> bool {
        !self.arguments.is_empty()
    }

    /// Primitives and types of [`CORE_NAMESPACE`].
    ///
    /// Only the core namespace counts, whatever namespaces a signature is configured to write
    /// without package. Type arguments are not inspected.
    pub fn is_builtin(&self) -> bool {
        match self.package.as_deref() {
            None => true,
            Some(package) => package == CORE_NAMESPACE,
        }
    }

    pub fn full_name(&self) -> String {
        self.to_string()
    }

    /// Renders the name, omitting the package wherever `hide_package` returns `true` for it.
    /// Type arguments are rendered by the same rule.
    pub fn display_name<F>(&self, hide_package: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut out = String::new();
        self.write_display_name(&mut out, &hide_package);
        out
    }

    fn write_display_name<F>(&self, out: &mut String, hide_package: &F)
    where
        F: Fn(&str) -> bool,
    {
        if let Some(package) = self.package.as_deref() {
            if !hide_package(package) {
                out.push_str(package);
                out.push('.');
            }
        }
        out.push_str(&self.name);
        if !self.arguments.is_empty() {
            out.push('<');
            for (i, argument) in self.arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                argument.write_display_name(out, hide_package);
            }
            out.push('>');
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name(|_| false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name() {
        assert_eq!(TypeDescriptor::primitive("int").full_name(), "int");
        assert_eq!(
            TypeDescriptor::reference("org.example", "Foo").full_name(),
            "org.example.Foo"
        );
        let list = TypeDescriptor::list_of(TypeDescriptor::reference("org.example", "Foo"));
        assert_eq!(list.full_name(), "core.List<org.example.Foo>");
    }

    #[test]
    fn display_name_hides_selected_packages_only() {
        let list = TypeDescriptor::list_of(TypeDescriptor::reference("org.example", "Foo"));
        assert_eq!(
            list.display_name(|p| p == CORE_NAMESPACE),
            "List<org.example.Foo>"
        );
        assert_eq!(list.display_name(|_| true), "List<Foo>");
    }

    #[test]
    fn builtin() {
        assert!(TypeDescriptor::primitive("boolean").is_builtin());
        assert!(TypeDescriptor::core("String").is_builtin());
        assert!(!TypeDescriptor::reference("core.internal", "Foo").is_builtin());
        assert!(!TypeDescriptor::reference("p", "A").is_builtin());
        assert!(!TypeDescriptor::reference("org.example", "Foo").is_builtin());
        assert!(TypeDescriptor::list_of(TypeDescriptor::reference("org.example", "Foo")).is_builtin());
    }

    #[test]
    fn presentation_does_not_affect_identity() {
        let a = TypeDescriptor::core("String");
        let b = TypeDescriptor::reference("org.example", "String");
        assert_eq!(a.display_name(|_| true), b.display_name(|_| true));
        assert_ne!(a, b);
    }
}
