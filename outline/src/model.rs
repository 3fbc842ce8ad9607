use dt_builtins::TypeDescriptor;

use super::Ref;

/// A named grouping of classes. Two packages with the same name are the same package; the
/// [builder](crate::OutlineBuilder) interns them by name.
#[derive(Clone, Debug)]
pub struct PackageContainer {
    pub name: String,
}

/// One generated class.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    /// Simple name, without package or enclosing classes.
    pub name: String,
    pub package: Ref<PackageContainer>,
    /// `Some` for nested classes.
    pub enclosing: Option<Ref<ClassDescriptor>>,
    /// Fields declared by this class itself, in declaration order.
    pub declared_fields: Vec<Ref<FieldDescriptor>>,
    /// Base classes and interfaces, in declaration order and without duplicates.
    pub supertypes: Vec<Ref<ClassDescriptor>>,
    /// Filled in when the outline is finished, in creation order.
    pub nested_classes: Vec<Ref<ClassDescriptor>>,
}

/// One property of a generated class.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_: TypeDescriptor,
    pub owner: Ref<ClassDescriptor>,
}
