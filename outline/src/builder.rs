use std::collections::HashMap;

use dt_builtins::TypeDescriptor;
use tracing::debug;

use super::components::{ComponentTable, ConstructionComponentTable};
use super::{
    ClassDescriptor, FieldDescriptor, ModelIntegrityError, Outline, PackageContainer, Ref,
};

/// Assembles an [`Outline`].
///
/// Classes may be [reserved](Self::reserve_class()) before they are defined, so that a schema can
/// refer to a type before declaring it. [`Self::finish()`] checks the structural invariants and
/// freezes the result.
#[derive(Default)]
pub struct OutlineBuilder {
    table: ConstructionComponentTable,
    packages: HashMap<String, Ref<PackageContainer>>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the package with this name, creating it on first use.
    pub fn package(&mut self, name: &str) -> Ref<PackageContainer> {
        if let Some(package) = self.packages.get(name) {
            return *package;
        }
        let package = self.table.create(PackageContainer {
            name: name.to_owned(),
        });
        self.packages.insert(name.to_owned(), package);
        package
    }

    pub fn reserve_class(&mut self) -> Ref<ClassDescriptor> {
        self.table.reserve()
    }

    /// Defines a previously [reserved](Self::reserve_class()) class.
    pub fn define_class(
        &mut self,
        class: Ref<ClassDescriptor>,
        name: impl Into<String>,
        package: Ref<PackageContainer>,
        enclosing: Option<Ref<ClassDescriptor>>,
    ) -> Result<Ref<ClassDescriptor>, ModelIntegrityError> {
        if self.table.try_get(class).is_some() {
            return Err(ModelIntegrityError::DuplicateClass(self.describe(class)));
        }
        Ok(self.insert_class(class, name.into(), package, enclosing))
    }

    /// Shorthand for reserving and defining a class.
    pub fn add_class(
        &mut self,
        name: impl Into<String>,
        package: Ref<PackageContainer>,
        enclosing: Option<Ref<ClassDescriptor>>,
    ) -> Ref<ClassDescriptor> {
        let class = self.reserve_class();
        self.insert_class(class, name.into(), package, enclosing)
    }

    fn insert_class(
        &mut self,
        class: Ref<ClassDescriptor>,
        name: String,
        package: Ref<PackageContainer>,
        enclosing: Option<Ref<ClassDescriptor>>,
    ) -> Ref<ClassDescriptor> {
        self.table.insert(
            class,
            ClassDescriptor {
                name,
                package,
                enclosing,
                declared_fields: Vec::new(),
                supertypes: Vec::new(),
                nested_classes: Vec::new(),
            },
        )
    }

    /// Appends a field to the declared fields of `class`.
    pub fn add_field(
        &mut self,
        class: Ref<ClassDescriptor>,
        name: impl Into<String>,
        type_: TypeDescriptor,
    ) -> Result<Ref<FieldDescriptor>, ModelIntegrityError> {
        let name = name.into();
        let owner = self.defined(class)?;
        let duplicate = owner
            .declared_fields
            .iter()
            .any(|field| self.table.get(*field).name == name);
        if duplicate {
            return Err(ModelIntegrityError::DuplicateField {
                class: self.describe(class),
                field: name,
            });
        }

        let field = self.table.create(FieldDescriptor {
            name,
            type_,
            owner: class,
        });
        self.defined_mut(class)?.declared_fields.push(field);
        Ok(field)
    }

    /// Adds `supertype` to the supertypes of `class`. The supertype may still be undefined; adding
    /// the same supertype twice has no effect.
    pub fn add_supertype(
        &mut self,
        class: Ref<ClassDescriptor>,
        supertype: Ref<ClassDescriptor>,
    ) -> Result<(), ModelIntegrityError> {
        let class = self.defined_mut(class)?;
        if !class.supertypes.contains(&supertype) {
            class.supertypes.push(supertype);
        }
        Ok(())
    }

    /// The type descriptor under which fields refer to `class`.
    ///
    /// `class` and all of its enclosing classes must be defined.
    pub fn type_of(&self, class: Ref<ClassDescriptor>) -> Result<TypeDescriptor, ModelIntegrityError> {
        let descriptor = self.defined(class)?;
        let mut name = descriptor.name.clone();
        let mut current = descriptor.enclosing;
        let mut depth = 0;
        while let Some(enclosing) = current {
            depth += 1;
            if enclosing == class || depth > self.table.len::<ClassDescriptor>() {
                return Err(ModelIntegrityError::NestingCycle(descriptor.name.clone()));
            }
            let enclosing = self.defined(enclosing)?;
            name = format!("{}.{}", enclosing.name, name);
            current = enclosing.enclosing;
        }
        let package = &self.table.get(descriptor.package).name;
        Ok(TypeDescriptor::reference(package.clone(), name))
    }

    /// Checks the invariants of the outline and freezes it.
    pub fn finish(mut self) -> Result<Outline, ModelIntegrityError> {
        let class_count = self.table.len::<ClassDescriptor>();
        let mut class_types = Vec::with_capacity(class_count);
        let mut class_names = HashMap::with_capacity(class_count);
        let mut nesting = Vec::new();

        for index in 0..class_count {
            let class = Ref::from_index(index);
            let class_type = self.type_of(class)?;
            let descriptor = self.table.get(class);
            if let Some(enclosing) = descriptor.enclosing {
                let enclosing_package = self.table.get(enclosing).package;
                if enclosing_package != descriptor.package {
                    return Err(ModelIntegrityError::PackageMismatch {
                        class: class_type.full_name(),
                        package: self.table.get(descriptor.package).name.clone(),
                        enclosing_package: self.table.get(enclosing_package).name.clone(),
                    });
                }
                nesting.push((enclosing, class));
            }
            let key = (
                self.table.get(descriptor.package).name.clone(),
                class_type.name().to_owned(),
            );
            if class_names.insert(key, class).is_some() {
                return Err(ModelIntegrityError::DuplicateClass(class_type.full_name()));
            }
            class_types.push(class_type);
        }

        self.check_supertype_cycles(&class_types)?;

        for (enclosing, class) in nesting {
            self.defined_mut(enclosing)?.nested_classes.push(class);
        }

        let package_count = self.packages.len();
        let table = self
            .table
            .convert_to_outline_table()
            .expect("every class was checked to be defined");
        debug!(
            classes = class_count,
            packages = package_count,
            "finished outline"
        );
        Ok(Outline::new(
            table,
            class_types.into_boxed_slice(),
            class_names,
        ))
    }

    /// Depth-first search over the supertype edges; all classes are known to be defined.
    fn check_supertype_cycles(
        &self,
        class_types: &[TypeDescriptor],
    ) -> Result<(), ModelIntegrityError> {
        #[derive(Copy, Clone, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            table: &ConstructionComponentTable,
            marks: &mut [Mark],
            class: Ref<ClassDescriptor>,
        ) -> Result<(), Ref<ClassDescriptor>> {
            match marks[class.index()] {
                Mark::Done => return Ok(()),
                Mark::InProgress => return Err(class),
                Mark::Unvisited => {}
            }
            marks[class.index()] = Mark::InProgress;
            for supertype in &table.get(class).supertypes {
                visit(table, marks, *supertype)?;
            }
            marks[class.index()] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; class_types.len()];
        for index in 0..class_types.len() {
            visit(&self.table, &mut marks, Ref::from_index(index)).map_err(|class| {
                ModelIntegrityError::SupertypeCycle(class_types[class.index()].full_name())
            })?;
        }
        Ok(())
    }

    fn defined(&self, class: Ref<ClassDescriptor>) -> Result<&ClassDescriptor, ModelIntegrityError> {
        self.table
            .try_get(class)
            .ok_or_else(|| ModelIntegrityError::UndefinedClass(format!("{class:?}")))
    }

    fn defined_mut(
        &mut self,
        class: Ref<ClassDescriptor>,
    ) -> Result<&mut ClassDescriptor, ModelIntegrityError> {
        self.table
            .try_get_mut(class)
            .ok_or_else(|| ModelIntegrityError::UndefinedClass(format!("{class:?}")))
    }

    /// Best-effort name of a class for error messages.
    fn describe(&self, class: Ref<ClassDescriptor>) -> String {
        match self.type_of(class) {
            Ok(type_) => type_.full_name(),
            Err(_) => format!("{class:?}"),
        }
    }
}
