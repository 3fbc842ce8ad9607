//! Signature of an outline: a deterministic text rendering of its packages, classes and fields.
//!
//! ```text
//! package com.example.ipo {
//!   interface Items {
//!     List<com.example.ipo.Items.Item> item;
//!     interface Item {
//!       String productName;
//!     }
//!   }
//! }
//! ```
//!
//! Packages are sorted by name. Classes appear in the outline's creation order, fields and
//! supertypes in declaration order. Field types are package-qualified unless their package is a
//! built-in namespace; supertypes from the package being written are shown by their simple name. The output is compared verbatim against earlier runs, so any
//! change to its shape is a compatibility break.

use std::collections::BTreeMap;
use std::io::{self, Write};

use dt_builtins::{TypeDescriptor, CORE_NAMESPACE};
use tracing::debug;

use super::{ClassDescriptor, Outline, Ref, SignatureError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureOptions {
    /// Packages whose names are omitted when rendering types.
    pub builtin_namespaces: Vec<String>,
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            builtin_namespaces: vec![CORE_NAMESPACE.to_owned()],
        }
    }
}

/// Writes the signature of `outline` to `out` and flushes it.
pub fn write(
    outline: &Outline,
    options: &SignatureOptions,
    out: impl Write,
) -> Result<(), SignatureError> {
    SignatureWriter::new(outline, options, out).dump()?;
    Ok(())
}

/// The signature of `outline` as a string.
pub fn to_string(outline: &Outline, options: &SignatureOptions) -> String {
    let mut buf = Vec::new();
    write(outline, options, &mut buf).expect("writing to a Vec does not fail");
    String::from_utf8(buf).expect("signature is built from UTF-8 names")
}

struct SignatureWriter<'a, W> {
    outline: &'a Outline,
    options: &'a SignatureOptions,
    out: W,
    indent: usize,
    /// Package whose block is being written; its name is omitted from supertypes.
    package: &'a str,
}

impl<'a, W: Write> SignatureWriter<'a, W> {
    fn new(outline: &'a Outline, options: &'a SignatureOptions, out: W) -> Self {
        Self {
            outline,
            options,
            out,
            indent: 0,
            package: "",
        }
    }

    fn println(&mut self, line: &str) -> io::Result<()> {
        for _ in 0..self.indent {
            self.out.write_all(b"  ")?;
        }
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")
    }

    fn dump(mut self) -> io::Result<()> {
        let outline = self.outline;

        // Grouping by name orders the packages; classes keep the outline's order within each.
        let mut packages: BTreeMap<&str, Vec<Ref<ClassDescriptor>>> = BTreeMap::new();
        for class in outline.top_level_classes() {
            let package = class.get(outline).package.get(outline);
            packages.entry(package.name.as_str()).or_default().push(class);
        }
        debug!(packages = packages.len(), "writing signature");

        for (package, classes) in packages {
            self.dump_package(package, &classes)?;
        }

        self.out.flush()
    }

    fn dump_package(&mut self, package: &'a str, classes: &[Ref<ClassDescriptor>]) -> io::Result<()> {
        self.println(&format!("package {package} {{"))?;
        self.package = package;
        self.indent += 1;
        for class in classes {
            self.dump_class(*class)?;
        }
        self.indent -= 1;
        self.println("}")
    }

    fn dump_class(&mut self, class: Ref<ClassDescriptor>) -> io::Result<()> {
        let outline = self.outline;
        let class = class.get(outline);

        let mut line = format!("interface {}", class.name);
        for (i, supertype) in class.supertypes.iter().enumerate() {
            line.push_str(if i == 0 { " extends " } else { ", " });
            line.push_str(&self.supertype_name(outline.type_of(*supertype)));
        }
        line.push_str(" {");
        self.println(&line)?;
        self.indent += 1;

        for field in &class.declared_fields {
            let field = field.get(outline);
            let type_ = self.type_name(&field.type_);
            self.println(&format!("{type_} {};", field.name))?;
        }

        for nested in &class.nested_classes {
            self.dump_class(*nested)?;
        }

        self.indent -= 1;
        self.println("}")
    }

    fn is_builtin_namespace(&self, package: &str) -> bool {
        self.options
            .builtin_namespaces
            .iter()
            .any(|namespace| namespace == package)
    }

    /// Types of a built-in namespace are shown without package.
    fn type_name(&self, type_: &TypeDescriptor) -> String {
        type_.display_name(|package| self.is_builtin_namespace(package))
    }

    /// Like [`Self::type_name()`], but classes of the current package are also shown without
    /// package.
    fn supertype_name(&self, type_: &TypeDescriptor) -> String {
        type_.display_name(|package| package == self.package || self.is_builtin_namespace(package))
    }
}
