use std::collections::HashMap;

use dt_builtins::TypeDescriptor;
use dt_outline::{ClassDescriptor, Outline, OutlineBuilder, PackageContainer, Ref};
use roxmltree::{Node, NodeId};
use tracing::{debug, warn};

use super::builtins::{self, XS_ANY_TYPE_NAME, XS_NAMESPACE};
use super::error::XsdError;
use super::naming;
use super::xstypes::QName;
use super::{BuiltinOverwriteAction, ReadOptions, DEFAULT_PACKAGE};

/// Global declarations of a schema, by name.
#[derive(Default)]
struct TopLevelDeclarations<'a, 'input> {
    /// `<complexType>` and `<simpleType>` definitions
    types: HashMap<QName, Node<'a, 'input>>,
    elements: HashMap<QName, Node<'a, 'input>>,
    attributes: HashMap<QName, Node<'a, 'input>>,
}

/// What a `base` attribute refers to.
enum Base {
    AnyType,
    Class(Ref<ClassDescriptor>),
    Simple(TypeDescriptor),
}

/// State while binding a single schema document to an outline.
///
/// Mapping happens in two passes over the top-level declarations: the first registers them and
/// creates the classes of named complex types and of global elements with anonymous types (in
/// document order), the second fills in supertypes and fields. References between declarations can
/// therefore go in either direction.
pub(super) struct MappingContext<'a, 'input> {
    schema: Node<'a, 'input>,
    target_namespace: Option<&'a str>,
    builtin_overwrite: BuiltinOverwriteAction,
    builder: OutlineBuilder,
    package: Ref<PackageContainer>,
    top_level: TopLevelDeclarations<'a, 'input>,
    /// Classes bound from `<complexType>` nodes
    classes: HashMap<NodeId, Ref<ClassDescriptor>>,
    /// Simple types currently being resolved
    resolving: Vec<NodeId>,
}

impl<'a, 'input: 'a> MappingContext<'a, 'input> {
    pub(super) fn map_schema(
        schema: Node<'a, 'input>,
        options: &ReadOptions,
    ) -> Result<Outline, XsdError> {
        let target_namespace = schema.attribute("targetNamespace");
        let package_name = options
            .package
            .clone()
            .or_else(|| target_namespace.map(naming::namespace_to_package))
            .unwrap_or_else(|| DEFAULT_PACKAGE.to_owned());

        let mut builder = OutlineBuilder::new();
        let package = builder.package(&package_name);
        debug!(package = %package_name, ?target_namespace, "mapping schema");

        let mut context = Self {
            schema,
            target_namespace,
            builtin_overwrite: options.builtin_overwrite,
            builder,
            package,
            top_level: TopLevelDeclarations::default(),
            classes: HashMap::new(),
            resolving: Vec::new(),
        };
        context.register_top_level()?;
        context.map_top_level()?;

        Ok(context.builder.finish()?)
    }

    fn top_level_name(&self, node: Node) -> Result<QName, XsdError> {
        let name = required_attribute(node, "name")?;
        Ok(QName::with_optional_namespace(self.target_namespace, name))
    }

    fn register_top_level(&mut self) -> Result<(), XsdError> {
        for child in xs_children(self.schema) {
            match child.tag_name().name() {
                kind @ ("complexType" | "simpleType") => {
                    let name = self.top_level_name(child)?;
                    if builtins::is_builtin_name(&name) {
                        match self.builtin_overwrite {
                            BuiltinOverwriteAction::Deny => {
                                return Err(XsdError::BuiltinOverwrite(name))
                            }
                            BuiltinOverwriteAction::Warn => {
                                warn!(%name, "overwriting built-in type")
                            }
                            BuiltinOverwriteAction::Allow => {}
                        }
                    }
                    if kind == "complexType" {
                        let class = self.builder.add_class(
                            naming::class_name(&name.local_name),
                            self.package,
                            None,
                        );
                        self.classes.insert(child.id(), class);
                    }
                    insert_unique(&mut self.top_level.types, name, child)?;
                }
                "element" => {
                    let name = self.top_level_name(child)?;
                    if let Some(complex_type) = xs_child(child, "complexType") {
                        let class = self.builder.add_class(
                            naming::class_name(&name.local_name),
                            self.package,
                            None,
                        );
                        self.classes.insert(complex_type.id(), class);
                    }
                    insert_unique(&mut self.top_level.elements, name, child)?;
                }
                "attribute" => {
                    let name = self.top_level_name(child)?;
                    insert_unique(&mut self.top_level.attributes, name, child)?;
                }
                kind @ ("import" | "include" | "redefine" | "override") => {
                    warn!(
                        schema_location = ?child.attribute("schemaLocation"),
                        "<{kind}> is not followed"
                    );
                }
                "annotation" | "notation" | "defaultOpenContent" => {}
                other => skip(other),
            }
        }
        Ok(())
    }

    fn map_top_level(&mut self) -> Result<(), XsdError> {
        for child in xs_children(self.schema) {
            let complex_type = match child.tag_name().name() {
                "complexType" => child,
                "element" => match xs_child(child, "complexType") {
                    Some(complex_type) => complex_type,
                    None => continue,
                },
                _ => continue,
            };
            let class = self.classes[&complex_type.id()];
            self.map_complex_type(class, complex_type)?;
        }
        Ok(())
    }

    /// Maps the content of a `<complexType>`, or of the `<extension>` of its complex content.
    fn map_complex_type(
        &mut self,
        class: Ref<ClassDescriptor>,
        node: Node<'a, 'input>,
    ) -> Result<(), XsdError> {
        for child in xs_children(node) {
            match child.tag_name().name() {
                "sequence" | "choice" | "all" => self.map_model_group(class, child, false)?,
                "attribute" => self.map_attribute(class, child)?,
                "complexContent" => self.map_complex_content(class, child)?,
                "simpleContent" => self.map_simple_content(class, child)?,
                "annotation" | "assert" | "openContent" => {}
                other => skip(other),
            }
        }
        Ok(())
    }

    fn map_complex_content(
        &mut self,
        class: Ref<ClassDescriptor>,
        node: Node<'a, 'input>,
    ) -> Result<(), XsdError> {
        let Some(derivation) = derivation_of(node) else {
            return Ok(());
        };
        let base = QName::parse(required_attribute(derivation, "base")?, derivation)?;
        match self.resolve_base(&base)? {
            Base::AnyType => {}
            Base::Class(supertype) => self.builder.add_supertype(class, supertype)?,
            Base::Simple(_) => warn!(%base, "complex content derived from a simple type"),
        }

        // A restriction repeats the content it keeps; only an extension adds to it.
        if derivation.tag_name().name() == "extension" {
            self.map_complex_type(class, derivation)?;
        }
        Ok(())
    }

    fn map_simple_content(
        &mut self,
        class: Ref<ClassDescriptor>,
        node: Node<'a, 'input>,
    ) -> Result<(), XsdError> {
        let Some(derivation) = derivation_of(node) else {
            return Ok(());
        };
        let base = QName::parse(required_attribute(derivation, "base")?, derivation)?;
        match self.resolve_base(&base)? {
            Base::Class(supertype) => self.builder.add_supertype(class, supertype)?,
            Base::Simple(type_) => {
                self.builder.add_field(class, "value", type_)?;
            }
            Base::AnyType => warn!(%base, "simple content derived from xs:anyType"),
        }

        if derivation.tag_name().name() == "extension" {
            for child in xs_children(derivation) {
                match child.tag_name().name() {
                    "attribute" => self.map_attribute(class, child)?,
                    "annotation" | "assert" => {}
                    other => skip(other),
                }
            }
        }
        Ok(())
    }

    /// Flattens a `<sequence>`, `<choice>` or `<all>` into fields of `class`. Elements of a
    /// repeated group are repeated themselves.
    fn map_model_group(
        &mut self,
        class: Ref<ClassDescriptor>,
        node: Node<'a, 'input>,
        repeated: bool,
    ) -> Result<(), XsdError> {
        let repeated = repeated || is_repeated(node)?;
        for child in xs_children(node) {
            match child.tag_name().name() {
                "element" => self.map_local_element(class, child, repeated)?,
                "sequence" | "choice" | "all" => self.map_model_group(class, child, repeated)?,
                "annotation" => {}
                other => skip(other),
            }
        }
        Ok(())
    }

    fn map_local_element(
        &mut self,
        class: Ref<ClassDescriptor>,
        node: Node<'a, 'input>,
        repeated: bool,
    ) -> Result<(), XsdError> {
        let repeated = repeated || is_repeated(node)?;
        let (name, declaration) = if let Some(reference) = node.attribute("ref") {
            let name = QName::parse(reference, node)?;
            let declaration = self
                .top_level
                .elements
                .get(&name)
                .copied()
                .ok_or_else(|| XsdError::UnresolvedElement(name.clone()))?;
            (name.local_name, declaration)
        } else {
            (required_attribute(node, "name")?.to_owned(), node)
        };

        let type_ = self.element_type(class, &name, declaration)?;
        let type_ = if repeated {
            TypeDescriptor::list_of(type_)
        } else {
            type_
        };
        self.builder
            .add_field(class, naming::field_name(&name), type_)?;
        Ok(())
    }

    /// The type of an element declaration. An anonymous complex type of a local element becomes a
    /// class nested in `class`.
    fn element_type(
        &mut self,
        class: Ref<ClassDescriptor>,
        name: &str,
        declaration: Node<'a, 'input>,
    ) -> Result<TypeDescriptor, XsdError> {
        if let Some(type_name) = declaration.attribute("type") {
            return self.resolve_type(&QName::parse(type_name, declaration)?);
        }

        if let Some(complex_type) = xs_child(declaration, "complexType") {
            let anonymous = match self.classes.get(&complex_type.id()) {
                Some(anonymous) => *anonymous,
                None => {
                    let nested =
                        self.builder
                            .add_class(naming::class_name(name), self.package, Some(class));
                    self.classes.insert(complex_type.id(), nested);
                    self.map_complex_type(nested, complex_type)?;
                    nested
                }
            };
            return Ok(self.builder.type_of(anonymous)?);
        }

        if let Some(simple_type) = xs_child(declaration, "simpleType") {
            return self.resolve_simple_type(simple_type);
        }

        // No type at all: the ur-type
        Ok(TypeDescriptor::core("Object"))
    }

    fn map_attribute(
        &mut self,
        class: Ref<ClassDescriptor>,
        node: Node<'a, 'input>,
    ) -> Result<(), XsdError> {
        if node.attribute("use") == Some("prohibited") {
            return Ok(());
        }

        let (name, declaration) = if let Some(reference) = node.attribute("ref") {
            let name = QName::parse(reference, node)?;
            match self.top_level.attributes.get(&name).copied() {
                Some(declaration) => (name.local_name, Some(declaration)),
                // e.g. xml:lang
                None if !name.is_in_namespace(self.target_namespace) => (name.local_name, None),
                None => return Err(XsdError::UnresolvedAttribute(name)),
            }
        } else {
            (required_attribute(node, "name")?.to_owned(), Some(node))
        };

        let type_ = match declaration {
            Some(declaration) => self.attribute_type(declaration)?,
            None => TypeDescriptor::core("String"),
        };
        self.builder
            .add_field(class, naming::field_name(&name), type_)?;
        Ok(())
    }

    fn attribute_type(&mut self, declaration: Node<'a, 'input>) -> Result<TypeDescriptor, XsdError> {
        if let Some(type_name) = declaration.attribute("type") {
            self.resolve_type(&QName::parse(type_name, declaration)?)
        } else if let Some(simple_type) = xs_child(declaration, "simpleType") {
            self.resolve_simple_type(simple_type)
        } else {
            Ok(TypeDescriptor::core("String"))
        }
    }

    /// Resolves a type reference. Types declared in the schema take precedence over built-ins.
    fn resolve_type(&mut self, name: &QName) -> Result<TypeDescriptor, XsdError> {
        if let Some(node) = self.top_level.types.get(name).copied() {
            if node.tag_name().name() == "complexType" {
                return Ok(self.builder.type_of(self.classes[&node.id()])?);
            }
            return self.resolve_simple_type(node);
        }
        builtins::builtin_type(name).ok_or_else(|| XsdError::UnresolvedType(name.clone()))
    }

    fn resolve_base(&mut self, name: &QName) -> Result<Base, XsdError> {
        match self.top_level.types.get(name).copied() {
            Some(node) if node.tag_name().name() == "complexType" => {
                Ok(Base::Class(self.classes[&node.id()]))
            }
            None if *name == *XS_ANY_TYPE_NAME => Ok(Base::AnyType),
            _ => Ok(Base::Simple(self.resolve_type(name)?)),
        }
    }

    /// Resolves a `<simpleType>` to the binding of the type it is ultimately restricted from. Lists
    /// bind to lists of their item type, unions to strings.
    fn resolve_simple_type(&mut self, node: Node<'a, 'input>) -> Result<TypeDescriptor, XsdError> {
        if self.resolving.contains(&node.id()) {
            let name = node.attribute("name").unwrap_or("(anonymous)");
            return Err(XsdError::CircularType(name.to_owned()));
        }
        self.resolving.push(node.id());
        let resolved = self.resolve_simple_type_content(node);
        self.resolving.pop();
        resolved
    }

    fn resolve_simple_type_content(
        &mut self,
        node: Node<'a, 'input>,
    ) -> Result<TypeDescriptor, XsdError> {
        for child in xs_children(node) {
            match child.tag_name().name() {
                "restriction" => return self.type_or_inline(child, "base"),
                "list" => {
                    let item = self.type_or_inline(child, "itemType")?;
                    return Ok(TypeDescriptor::list_of(item));
                }
                "union" => return Ok(TypeDescriptor::core("String")),
                _ => {}
            }
        }
        Ok(TypeDescriptor::core("String"))
    }

    /// The type named by `attribute` of `node`, or else its inline `<simpleType>`.
    fn type_or_inline(
        &mut self,
        node: Node<'a, 'input>,
        attribute: &str,
    ) -> Result<TypeDescriptor, XsdError> {
        if let Some(type_name) = node.attribute(attribute) {
            self.resolve_type(&QName::parse(type_name, node)?)
        } else if let Some(simple_type) = xs_child(node, "simpleType") {
            self.resolve_simple_type(simple_type)
        } else {
            Ok(TypeDescriptor::core("String"))
        }
    }
}

fn insert_unique<'a, 'input>(
    declarations: &mut HashMap<QName, Node<'a, 'input>>,
    name: QName,
    node: Node<'a, 'input>,
) -> Result<(), XsdError> {
    if declarations.contains_key(&name) {
        return Err(XsdError::DuplicateDeclaration(name));
    }
    declarations.insert(name, node);
    Ok(())
}

fn skip(construct: &str) {
    warn!(construct, "skipping unsupported schema construct");
}

fn xs_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|child| child.is_element() && child.tag_name().namespace() == Some(XS_NAMESPACE))
}

fn xs_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    xs_children(node).find(|child| child.tag_name().name() == name)
}

fn derivation_of<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    xs_children(node)
        .find(|child| matches!(child.tag_name().name(), "extension" | "restriction"))
}

fn required_attribute<'a>(node: Node<'a, '_>, attribute: &'static str) -> Result<&'a str, XsdError> {
    node.attribute(attribute)
        .ok_or_else(|| XsdError::MissingAttribute {
            element: node.tag_name().name().to_owned(),
            attribute,
        })
}

/// Whether a particle may occur more than once.
fn is_repeated(node: Node) -> Result<bool, XsdError> {
    match node.attribute("maxOccurs").map(str::trim) {
        None => Ok(false),
        Some("unbounded") => Ok(true),
        Some(max_occurs) => max_occurs
            .parse::<u64>()
            .map(|max_occurs| max_occurs > 1)
            .map_err(|_| XsdError::InvalidOccurs(max_occurs.to_owned())),
    }
}
