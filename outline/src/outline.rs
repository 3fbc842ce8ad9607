use std::collections::{BTreeMap, HashMap, HashSet};

use dt_builtins::{DerivationGraph, TypeDescriptor};

use super::components::{
    Component, ComponentTable, ComponentTraits, HasArenaContainer, OutlineComponentTable,
};
use super::{ClassDescriptor, FieldDescriptor, PackageContainer, Ref};

/// A finished, immutable outline.
///
/// Classes are enumerated in the order in which they were created in the builder; this order is
/// part of the outline and is what makes its [signature](crate::signature) reproducible.
#[derive(Debug)]
pub struct Outline {
    table: OutlineComponentTable,
    /// Indexed like the class container of `table`
    class_types: Box<[TypeDescriptor]>,
    /// Keyed by package name and the class name within the package (`Items.Item`)
    class_names: HashMap<(String, String), Ref<ClassDescriptor>>,
}

impl ComponentTable for Outline {
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        self.table.get(ref_)
    }
}

impl Outline {
    pub(crate) fn new(
        table: OutlineComponentTable,
        class_types: Box<[TypeDescriptor]>,
        class_names: HashMap<(String, String), Ref<ClassDescriptor>>,
    ) -> Self {
        Self {
            table,
            class_types,
            class_names,
        }
    }

    /// All classes, top-level and nested.
    pub fn classes(&self) -> impl Iterator<Item = Ref<ClassDescriptor>> {
        (0..self.table.len::<ClassDescriptor>()).map(Ref::from_index)
    }

    pub fn top_level_classes(&self) -> impl Iterator<Item = Ref<ClassDescriptor>> + '_ {
        self.classes()
            .filter(|class| class.get(self).enclosing.is_none())
    }

    pub fn class_count(&self) -> usize {
        self.table.len::<ClassDescriptor>()
    }

    /// The packages that contain top-level classes, sorted by name.
    pub fn packages(&self) -> Vec<Ref<PackageContainer>> {
        let packages: BTreeMap<&str, Ref<PackageContainer>> = self
            .top_level_classes()
            .map(|class| {
                let package = class.get(self).package;
                (package.get(self).name.as_str(), package)
            })
            .collect();
        packages.into_values().collect()
    }

    /// The type under which fields refer to `class`, e.g. `com.example.ipo.Items.Item`.
    pub fn type_of(&self, class: Ref<ClassDescriptor>) -> &TypeDescriptor {
        &self.class_types[class.index()]
    }

    /// Looks up a class by package and name; nested classes are named through their enclosing
    /// classes, e.g. `("com.example.ipo", "Items.Item")`.
    pub fn class_by_name(&self, package: &str, name: &str) -> Option<Ref<ClassDescriptor>> {
        self.class_names
            .get(&(package.to_owned(), name.to_owned()))
            .copied()
    }

    /// The class a type descriptor refers to, if it is a class of this outline.
    pub fn class_of(&self, type_: &TypeDescriptor) -> Option<Ref<ClassDescriptor>> {
        self.class_by_name(type_.package()?, type_.name())
    }

    pub fn package(&self, package: Ref<PackageContainer>) -> &PackageContainer {
        self.table.get(package)
    }

    pub fn class(&self, class: Ref<ClassDescriptor>) -> &ClassDescriptor {
        self.table.get(class)
    }

    pub fn field(&self, field: Ref<FieldDescriptor>) -> &FieldDescriptor {
        self.table.get(field)
    }

    /// Package-qualified name of `class`, with enclosing classes separated by dots.
    pub fn full_name(&self, class: Ref<ClassDescriptor>) -> String {
        self.type_of(class).full_name()
    }

    pub fn declared_fields(
        &self,
        class: Ref<ClassDescriptor>,
    ) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.class(class)
            .declared_fields
            .iter()
            .map(|field| self.field(*field))
    }

    pub fn supertypes(&self, class: Ref<ClassDescriptor>) -> &[Ref<ClassDescriptor>] {
        &self.class(class).supertypes
    }

    pub fn nested_classes(&self, class: Ref<ClassDescriptor>) -> &[Ref<ClassDescriptor>] {
        &self.class(class).nested_classes
    }

    pub fn enclosing_class(&self, class: Ref<ClassDescriptor>) -> Option<Ref<ClassDescriptor>> {
        self.class(class).enclosing
    }

    /// Supertypes of `class`, transitively, each reported once.
    pub fn ancestors(&self, class: Ref<ClassDescriptor>) -> Vec<Ref<ClassDescriptor>> {
        let mut seen = HashSet::new();
        let mut pending: Vec<_> = class.get(self).supertypes.iter().rev().copied().collect();
        let mut ancestors = Vec::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            ancestors.push(current);
            pending.extend(current.get(self).supertypes.iter().rev().copied());
        }
        ancestors
    }
}

/// The outline's supertype edges double as the derivation graph of its classes. `core.Object`
/// (the binding of `xs:anyType`) is an ancestor of every type.
impl DerivationGraph for Outline {
    fn is_ancestor_of(&self, declared: &TypeDescriptor, actual: &TypeDescriptor) -> bool {
        if declared == actual || *declared == TypeDescriptor::core("Object") {
            return true;
        }
        let Some(class) = self.class_of(actual) else {
            return false;
        };
        self.ancestors(class)
            .into_iter()
            .any(|ancestor| self.type_of(ancestor) == declared)
    }
}

#[cfg(test)]
mod tests {
    use dt_builtins::element::{Element, ElementName, TypedValue};

    use super::*;
    use crate::OutlineBuilder;

    fn ipo() -> Outline {
        let mut builder = OutlineBuilder::new();
        let ipo = builder.package("com.example.ipo");
        let address = builder.add_class("Address", ipo, None);
        let us_address = builder.add_class("UsAddress", ipo, None);
        let uk_address = builder.add_class("UkAddress", ipo, None);
        builder.add_supertype(us_address, address).unwrap();
        builder.add_supertype(uk_address, address).unwrap();
        let po = builder.add_class("PurchaseOrderType", ipo, None);
        let tax_exempt = builder.add_class("UsTaxExemptPurchaseOrderType", ipo, None);
        builder.add_supertype(tax_exempt, po).unwrap();
        builder.finish().unwrap()
    }

    fn ipo_type(name: &str) -> TypeDescriptor {
        TypeDescriptor::reference("com.example.ipo", name)
    }

    #[test]
    fn lookup_by_name() {
        let outline = ipo();
        let class = outline
            .class_by_name("com.example.ipo", "UsAddress")
            .unwrap();
        assert_eq!(class.get(&outline).name, "UsAddress");
        assert_eq!(outline.class_of(&ipo_type("UsAddress")), Some(class));
        assert!(outline.class_by_name("com.example", "ipo.UsAddress").is_none());
        assert!(outline.class_of(&TypeDescriptor::core("String")).is_none());
        assert_eq!(outline.class_count(), 5);
    }

    #[test]
    fn accessors() {
        let mut builder = OutlineBuilder::new();
        let p = builder.package("p");
        let outer = builder.add_class("Outer", p, None);
        let inner = builder.add_class("Inner", p, Some(outer));
        builder
            .add_field(inner, "x", TypeDescriptor::primitive("int"))
            .unwrap();
        builder.add_supertype(inner, outer).unwrap();
        let outline = builder.finish().unwrap();

        assert_eq!(outline.full_name(inner), "p.Outer.Inner");
        assert_eq!(outline.enclosing_class(inner), Some(outer));
        assert_eq!(outline.enclosing_class(outer), None);
        assert_eq!(outline.nested_classes(outer), [inner]);
        assert_eq!(outline.supertypes(inner), [outer]);
        assert_eq!(outline.package(outline.class(inner).package).name, "p");
        let fields: Vec<_> = outline.declared_fields(inner).collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "x");
        assert_eq!(fields[0].owner, inner);
        assert_eq!(outline.packages(), vec![p]);
    }

    #[test]
    fn derivation_graph() {
        let outline = ipo();
        assert!(outline.is_ancestor_of(&ipo_type("Address"), &ipo_type("UsAddress")));
        assert!(outline.is_ancestor_of(&ipo_type("Address"), &ipo_type("Address")));
        assert!(!outline.is_ancestor_of(&ipo_type("UsAddress"), &ipo_type("Address")));
        assert!(!outline.is_ancestor_of(&ipo_type("UkAddress"), &ipo_type("UsAddress")));
        assert!(!outline.is_ancestor_of(&ipo_type("Address"), &ipo_type("Unknown")));
        assert!(outline.is_ancestor_of(&TypeDescriptor::core("Object"), &ipo_type("Address")));
    }

    #[test]
    fn transitive_ancestors() {
        let mut builder = OutlineBuilder::new();
        let p = builder.package("p");
        let a = builder.add_class("A", p, None);
        let b = builder.add_class("B", p, None);
        let c = builder.add_class("C", p, None);
        let d = builder.add_class("D", p, None);
        builder.add_supertype(b, a).unwrap();
        builder.add_supertype(c, b).unwrap();
        builder.add_supertype(d, b).unwrap();
        builder.add_supertype(d, a).unwrap();
        let outline = builder.finish().unwrap();
        assert_eq!(outline.ancestors(c), vec![b, a]);
        assert_eq!(outline.ancestors(d), vec![b, a]);
        assert!(outline.is_ancestor_of(outline.type_of(a), outline.type_of(c)));
    }

    struct Shipping(TypeDescriptor);

    impl TypedValue for Shipping {
        fn type_descriptor(&self) -> TypeDescriptor {
            self.0.clone()
        }
    }

    #[test]
    fn outline_checks_substitutions() {
        let outline = ipo();
        let name = ElementName::new(None::<String>, "shipTo");
        let element = Element::wrap(
            &outline,
            name.clone(),
            ipo_type("Address"),
            Shipping(ipo_type("UkAddress")),
        )
        .unwrap();
        assert!(element.is_type_substituted());

        assert!(Element::wrap(
            &outline,
            name,
            ipo_type("Address"),
            Shipping(ipo_type("PurchaseOrderType")),
        )
        .is_err());
    }
}
