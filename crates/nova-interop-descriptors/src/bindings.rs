use std::collections::HashMap;

use nova_interop_model::DeclarationSite;

use crate::ids::{ClassId, ConstructorId, FunctionId, PackageId, PropertyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRef {
    Class(ClassId),
    Package(PackageId),
    Function(FunctionId),
    Property(PropertyId),
    Constructor(ConstructorId),
}

/// Append-only record of which descriptors were built from which foreign
/// declarations. A property may come from several sites (field, getter,
/// setter); a site may produce several descriptors.
#[derive(Debug, Default)]
pub struct BindingTable {
    entries: Vec<(DeclarationSite, DescriptorRef)>,
    by_site: HashMap<DeclarationSite, Vec<usize>>,
    by_descriptor: HashMap<DescriptorRef, usize>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, site: DeclarationSite, descriptor: DescriptorRef) {
        let already = self
            .by_site
            .get(&site)
            .is_some_and(|idxs| idxs.iter().any(|idx| self.entries[*idx].1 == descriptor));
        if already {
            return;
        }
        let idx = self.entries.len();
        self.by_site.entry(site.clone()).or_default().push(idx);
        self.by_descriptor.entry(descriptor).or_insert(idx);
        self.entries.push((site, descriptor));
    }

    pub fn descriptors_for(&self, site: &DeclarationSite) -> Vec<DescriptorRef> {
        self.by_site
            .get(site)
            .map(|idxs| idxs.iter().map(|idx| self.entries[*idx].1).collect())
            .unwrap_or_default()
    }

    /// First site recorded for a descriptor.
    pub fn site_of(&self, descriptor: DescriptorRef) -> Option<&DeclarationSite> {
        self.by_descriptor
            .get(&descriptor)
            .map(|idx| &self.entries[*idx].0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_interop_model::FqName;

    #[test]
    fn records_are_deduplicated_and_ordered() {
        let mut table = BindingTable::new();
        let field = DeclarationSite::Field {
            owner: FqName::new("a.B"),
            name: "x".to_string(),
        };
        let getter = DeclarationSite::Method {
            owner: FqName::new("a.B"),
            name: "getX".to_string(),
            index: 0,
        };
        let property = DescriptorRef::Property(PropertyId::from_raw(3));
        table.record(getter.clone(), property);
        table.record(field.clone(), property);
        table.record(field.clone(), property);

        assert_eq!(table.len(), 2);
        assert_eq!(table.descriptors_for(&field), vec![property]);
        assert_eq!(table.site_of(property), Some(&getter));
        assert!(table
            .descriptors_for(&DeclarationSite::Class(FqName::new("a.B")))
            .is_empty());
    }
}
