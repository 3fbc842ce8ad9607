use std::collections::HashMap;

use thiserror::Error;

use crate::TypeDescriptor;

/// The "is-a" relation between schema types (derivation by extension or restriction).
pub trait DerivationGraph {
    /// Whether `declared` is `actual` itself or one of its ancestors. The relation is reflexive and
    /// transitive.
    fn is_ancestor_of(&self, declared: &TypeDescriptor, actual: &TypeDescriptor) -> bool;
}

impl<G: DerivationGraph + ?Sized> DerivationGraph for &G {
    fn is_ancestor_of(&self, declared: &TypeDescriptor, actual: &TypeDescriptor) -> bool {
        (**self).is_ancestor_of(declared, actual)
    }
}

/// The runtime type of a value is unrelated to the type declared for its element.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("type {actual} is not derived from the declared type {declared}")]
pub struct InvalidSubstitutionError {
    pub declared: TypeDescriptor,
    pub actual: TypeDescriptor,
}

/// `true` if `actual` strictly derives from `declared`, `false` if both are the same type.
///
/// A type that is not reachable from `declared` at all is an error rather than `false`.
pub fn is_strict_derivation(
    graph: &(impl DerivationGraph + ?Sized),
    actual: &TypeDescriptor,
    declared: &TypeDescriptor,
) -> Result<bool, InvalidSubstitutionError> {
    if actual == declared {
        Ok(false)
    } else if graph.is_ancestor_of(declared, actual) {
        Ok(true)
    } else {
        Err(InvalidSubstitutionError {
            declared: declared.clone(),
            actual: actual.clone(),
        })
    }
}

/// Single-inheritance derivation table: every type has at most one base type.
///
/// Generated bindings that do not carry a full outline register their `{base type definition}`
/// links here.
#[derive(Clone, Debug, Default)]
pub struct BaseTypeTable {
    bases: HashMap<TypeDescriptor, TypeDescriptor>,
}

impl BaseTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `base` as the base type of `derived`, returning the previously recorded base.
    pub fn insert(
        &mut self,
        derived: TypeDescriptor,
        base: TypeDescriptor,
    ) -> Option<TypeDescriptor> {
        self.bases.insert(derived, base)
    }

    pub fn base_of(&self, type_: &TypeDescriptor) -> Option<&TypeDescriptor> {
        self.bases.get(type_)
    }

    pub fn ancestors<'a>(&'a self, type_: &'a TypeDescriptor) -> Ancestors<'a> {
        Ancestors {
            current: self.base_of(type_),
            table: self,
            remaining: self.bases.len(),
        }
    }
}

impl DerivationGraph for BaseTypeTable {
    fn is_ancestor_of(&self, declared: &TypeDescriptor, actual: &TypeDescriptor) -> bool {
        declared == actual || self.ancestors(actual).any(|ancestor| ancestor == declared)
    }
}

/// Iterator over the ancestors of a type: its base type and the ancestors of its base type.
///
/// Stops at a type without a base. The walk is bounded by the number of links in the table, so a
/// malformed (cyclic) table still terminates.
pub struct Ancestors<'a> {
    current: Option<&'a TypeDescriptor>,
    table: &'a BaseTypeTable,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.current?;
        self.current = self.table.base_of(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ipo(name: &str) -> TypeDescriptor {
        TypeDescriptor::reference("com.example.ipo", name)
    }

    fn table() -> BaseTypeTable {
        let mut table = BaseTypeTable::new();
        table.insert(ipo("UsAddress"), ipo("Address"));
        table.insert(ipo("UkAddress"), ipo("Address"));
        table.insert(ipo("UsTaxExemptPurchaseOrderType"), ipo("PurchaseOrderType"));
        table
    }

    #[test]
    fn ancestors() {
        let mut table = table();
        table.insert(ipo("Address"), TypeDescriptor::core("Object"));
        let ancestors: Vec<_> = table.ancestors(&ipo("UsAddress")).cloned().collect();
        assert_eq!(ancestors, vec![ipo("Address"), TypeDescriptor::core("Object")]);
        assert_eq!(table.ancestors(&TypeDescriptor::core("Object")).count(), 0);
    }

    #[test]
    fn ancestor_relation_is_reflexive_and_transitive() {
        let mut table = table();
        table.insert(ipo("Address"), TypeDescriptor::core("Object"));
        assert!(table.is_ancestor_of(&ipo("Address"), &ipo("Address")));
        assert!(table.is_ancestor_of(&ipo("Address"), &ipo("UsAddress")));
        assert!(table.is_ancestor_of(&TypeDescriptor::core("Object"), &ipo("UsAddress")));
        assert!(!table.is_ancestor_of(&ipo("UsAddress"), &ipo("Address")));
        assert!(!table.is_ancestor_of(&ipo("UkAddress"), &ipo("UsAddress")));
    }

    #[test]
    fn strict_derivation() {
        let table = table();
        assert_eq!(
            is_strict_derivation(&table, &ipo("UsAddress"), &ipo("Address")),
            Ok(true)
        );
        assert_eq!(
            is_strict_derivation(&table, &ipo("Address"), &ipo("Address")),
            Ok(false)
        );
        let err = is_strict_derivation(&table, &ipo("Address"), &ipo("PurchaseOrderType"))
            .unwrap_err();
        assert_eq!(err.actual, ipo("Address"));
        assert_eq!(err.declared, ipo("PurchaseOrderType"));
    }

    #[test]
    fn cyclic_table_terminates() {
        let mut table = BaseTypeTable::new();
        table.insert(ipo("A"), ipo("B"));
        table.insert(ipo("B"), ipo("A"));
        assert!(!table.is_ancestor_of(&ipo("C"), &ipo("A")));
        assert_eq!(table.ancestors(&ipo("A")).count(), 2);
    }
}
