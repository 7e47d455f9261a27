use std::collections::{BTreeMap, HashMap};

use crate::class::ForeignClass;
use crate::error::{Error, Result};
use crate::name::FqName;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignPackage {
    pub fq_name: FqName,
    /// Top-level classes only.
    pub classes: Vec<FqName>,
    pub subpackages: Vec<FqName>,
}

/// Lookup surface of the class/package index the resolver reads from.
pub trait ClassModel {
    fn find_class(&self, fq_name: &FqName) -> Option<&ForeignClass>;

    fn find_package(&self, fq_name: &FqName) -> Option<&ForeignPackage>;
}

/// Model backed by hash maps; packages are registered as classes are added.
#[derive(Debug, Default)]
pub struct InMemoryClassModel {
    classes: HashMap<FqName, ForeignClass>,
    packages: BTreeMap<FqName, ForeignPackage>,
}

impl InMemoryClassModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class. Nested classes must be added after their outer class.
    pub fn add_class(&mut self, class: ForeignClass) -> Result<()> {
        if self.classes.contains_key(&class.fq_name) {
            return Err(Error::DuplicateClass(class.fq_name.to_string()));
        }

        match &class.outer {
            Some(outer) => {
                if !self.classes.contains_key(outer) {
                    return Err(Error::OuterClassMissing {
                        class: class.fq_name.to_string(),
                        outer: outer.to_string(),
                    });
                }
            }
            None => {
                let package = class.fq_name.parent().unwrap_or_default();
                self.ensure_package(&package).classes.push(class.fq_name.clone());
            }
        }

        self.classes.insert(class.fq_name.clone(), class);
        Ok(())
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn ensure_package(&mut self, fq_name: &FqName) -> &mut ForeignPackage {
        if !self.packages.contains_key(fq_name) {
            if let Some(parent) = fq_name.parent() {
                self.ensure_package(&parent).subpackages.push(fq_name.clone());
            }
        }
        self.packages
            .entry(fq_name.clone())
            .or_insert_with(|| ForeignPackage {
                fq_name: fq_name.clone(),
                ..ForeignPackage::default()
            })
    }
}

impl ClassModel for InMemoryClassModel {
    fn find_class(&self, fq_name: &FqName) -> Option<&ForeignClass> {
        self.classes.get(fq_name)
    }

    fn find_package(&self, fq_name: &FqName) -> Option<&ForeignPackage> {
        self.packages.get(fq_name)
    }
}

/// Queries several models in order; the first hit wins.
pub struct ChainClassModel<'a> {
    models: Vec<&'a dyn ClassModel>,
}

impl<'a> ChainClassModel<'a> {
    pub fn new(models: Vec<&'a dyn ClassModel>) -> Self {
        Self { models }
    }
}

impl ClassModel for ChainClassModel<'_> {
    fn find_class(&self, fq_name: &FqName) -> Option<&ForeignClass> {
        self.models.iter().find_map(|model| model.find_class(fq_name))
    }

    fn find_package(&self, fq_name: &FqName) -> Option<&ForeignPackage> {
        self.models.iter().find_map(|model| model.find_package(fq_name))
    }
}
