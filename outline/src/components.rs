use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::{NonZeroU32, NonZeroUsize};

use super::{ClassDescriptor, FieldDescriptor, PackageContainer};

/// Trait implemented by all descriptors stored in an outline.
pub trait Component {
    const DISPLAY_NAME: &'static str;
}

/// Type on which internal component traits are implemented.
///
/// This type is used to prevent leaking internal functions into the [`Component`]
pub struct ComponentTraits;

/// A component referencable via [`Ref`]. Intended for internal use.
pub trait HasArenaContainer<R: Component>: Sized {
    fn get_container_from_construction_table(table: &ConstructionComponentTable)
        -> &[Option<R>];
    fn get_container_from_construction_table_mut(
        table: &mut ConstructionComponentTable,
    ) -> &mut Vec<Option<R>>;
    fn get_container_from_outline_table(table: &OutlineComponentTable) -> &[R];
}

/// A handle to a [`Component`] stored in a [`ComponentTable`].
///
/// Handles are how descriptors point at each other (owner, package, supertypes); the table owns
/// every descriptor.
pub struct Ref<R>(NonZeroU32, PhantomData<R>)
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>;

impl<R> Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    const fn from_inner(inner: NonZeroU32) -> Self {
        Self(inner, PhantomData)
    }

    pub(crate) fn from_index(index: usize) -> Self {
        let id: NonZeroUsize = NonZeroUsize::MIN.saturating_add(index);
        let id: NonZeroU32 = id.try_into().expect("ID did not fit into 32-bit integer");
        Self::from_inner(id)
    }

    pub(crate) fn index(self) -> usize {
        let size: NonZeroUsize = self
            .0
            .try_into()
            .expect("Could not convert component reference to usize index");
        usize::from(size) - 1
    }

    pub fn get(self, table: &impl ComponentTable) -> &R {
        table.get(self)
    }
}

// derive(...) does not work if T itself does not derive the trait, even though it is only "used"
// in the PhantomData; hence we have to manually implement required traits for the Ref type.

impl<R> Copy for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
}

impl<R> Clone for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> fmt::Debug for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{} #{}>", R::DISPLAY_NAME, self.0)
    }
}

impl<R> PartialEq for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<R> Eq for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
}

impl<R> Hash for Ref<R>
where
    R: Component,
    ComponentTraits: HasArenaContainer<R>,
{
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// An arena-like container for the descriptors of an outline
pub trait ComponentTable {
    /// Retrieves a component's value by reference from this component table.
    /// This function panics if the component value is not present in the table.
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>;
}

/// The [component table](ComponentTable) used while an outline is being built.
///
/// Class slots are wrapped in `Option`s, since a class may be referenced (as a supertype or a field
/// type) before it is defined.
#[derive(Default)]
pub struct ConstructionComponentTable {
    packages: Vec<Option<PackageContainer>>,
    classes: Vec<Option<ClassDescriptor>>,
    fields: Vec<Option<FieldDescriptor>>,
}

impl ComponentTable for ConstructionComponentTable {
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let container = ComponentTraits::get_container_from_construction_table(self);
        container
            .get(ref_.index())
            .expect("Invalid component reference (out-of-bounds)")
            .as_ref()
            .expect("Component is not present")
    }
}

impl ConstructionComponentTable {
    /// Creates a [`Ref`] which points to an absent, reserved slot in the table.
    pub(crate) fn reserve<R>(&mut self) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let container = ComponentTraits::get_container_from_construction_table_mut(self);

        // Reserve a slot by inserting None
        container.push(None);

        Ref::from_index(container.len() - 1)
    }

    /// Inserts the `value` into the slot pointed to by `ref_`. Returns `ref_` for convenience.
    pub(crate) fn insert<R>(&mut self, ref_: Ref<R>, value: R) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let container = ComponentTraits::get_container_from_construction_table_mut(self);

        let slot = container
            .get_mut(ref_.index())
            .expect("Invalid component reference (out-of-bounds)");

        *slot = Some(value);

        ref_
    }

    /// Shorthand for `insert(reserve(), value)`
    pub(crate) fn create<R>(&mut self, value: R) -> Ref<R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let ref_ = self.reserve();
        self.insert(ref_, value)
    }

    /// Like [`ComponentTable::get()`], but returns `None` for absent or foreign references.
    pub(crate) fn try_get<R>(&self, ref_: Ref<R>) -> Option<&R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        ComponentTraits::get_container_from_construction_table(self)
            .get(ref_.index())
            .and_then(Option::as_ref)
    }

    pub(crate) fn try_get_mut<R>(&mut self, ref_: Ref<R>) -> Option<&mut R>
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        ComponentTraits::get_container_from_construction_table_mut(self)
            .get_mut(ref_.index())
            .and_then(Option::as_mut)
    }

    /// Number of slots (present or reserved) for `R`.
    pub(crate) fn len<R>(&self) -> usize
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        ComponentTraits::get_container_from_construction_table(self).len()
    }

    /// Tries to convert this construction table to an [outline table](`OutlineComponentTable`).
    /// If a component value is absent, `None` is returned instead.
    pub(crate) fn convert_to_outline_table(self) -> Option<OutlineComponentTable> {
        Some(OutlineComponentTable {
            packages: Self::convert_container(self.packages)?,
            classes: Self::convert_container(self.classes)?,
            fields: Self::convert_container(self.fields)?,
        })
    }

    /// Helper for [`Self::convert_to_outline_table()`]
    fn convert_container<R>(container: Vec<Option<R>>) -> Option<Box<[R]>> {
        container.into_iter().collect()
    }
}

/// The [component table](ComponentTable) of a finished outline.
///
/// Components for which a [`Ref`] exists will always be present in this table. The table is
/// read-only, so the components are stored in boxed slices.
#[derive(Debug)]
pub struct OutlineComponentTable {
    packages: Box<[PackageContainer]>,
    classes: Box<[ClassDescriptor]>,
    fields: Box<[FieldDescriptor]>,
}

impl ComponentTable for OutlineComponentTable {
    fn get<R>(&self, ref_: Ref<R>) -> &R
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        let container = ComponentTraits::get_container_from_outline_table(self);
        container
            .get(ref_.index())
            .expect("Invalid component reference (out-of-bounds)")
    }
}

impl OutlineComponentTable {
    pub(crate) fn len<R>(&self) -> usize
    where
        R: Component,
        ComponentTraits: HasArenaContainer<R>,
    {
        ComponentTraits::get_container_from_outline_table(self).len()
    }
}

macro_rules! has_arena_container_impl {
    ($type_name:ty, $field_name:ident) => {
        impl Component for $type_name {
            const DISPLAY_NAME: &'static str = stringify!($type_name);
        }

        impl HasArenaContainer<$type_name> for ComponentTraits {
            fn get_container_from_construction_table(
                table: &ConstructionComponentTable,
            ) -> &[Option<$type_name>] {
                &table.$field_name
            }

            fn get_container_from_construction_table_mut(
                table: &mut ConstructionComponentTable,
            ) -> &mut Vec<Option<$type_name>> {
                &mut table.$field_name
            }

            fn get_container_from_outline_table(table: &OutlineComponentTable) -> &[$type_name] {
                &table.$field_name
            }
        }
    };
}

has_arena_container_impl!(PackageContainer, packages);
has_arena_container_impl!(ClassDescriptor, classes);
has_arena_container_impl!(FieldDescriptor, fields);
